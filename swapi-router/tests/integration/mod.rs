mod elasticsearch;
mod end_to_end;
mod server;

use std::path::PathBuf;

use swapi_router::model::Dataset;

pub(crate) fn dataset() -> Dataset {
    Dataset::from_path(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/dataset.json"),
    )
    .unwrap()
}
