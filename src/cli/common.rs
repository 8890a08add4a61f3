//! Just a dumping ground for cli stuff

use tracing::{error, info};

pub fn report_error(e: &anyhow::Error) {
    error!("{e}");

    for cause in e.chain().skip(1) {
        info!("caused by: {cause}");
    }
}
