//! # location-batch CLI
//!
//! Command-line interface for the location batcher.
//!
//! ## Usage
//! ```bash
//! location-batch run --source-dir ~/pool --target-dir ~/out --locations locations.json
//! location-batch plan --batch-size 5
//! location-batch status --output json
//! ```

mod cli;

use location_batcher::Result;

fn main() -> Result<()> {
    location_batcher::init_tracing();
    cli::run()
}
