use crate::location::{ParseOptions, RecordCache};
use std::sync::Mutex;

pub struct AppState {
    pub cache: Mutex<RecordCache>,
    pub options: ParseOptions,
}
