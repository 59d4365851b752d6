//! Spreadsheet logging: the response log seam plus the Apps Script web-app sink.

pub mod apps_script;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::SheetError;

pub use apps_script::AppsScriptLog;

/// One logged survey response. Phone is the bare nine-digit local number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    pub phone: String,
    pub status: String,
    pub feedback: String,
}

#[async_trait]
pub trait ResponseLog: Send + Sync {
    async fn append(&self, row: &SheetRow) -> Result<(), SheetError>;
}

/// In-memory sink for tests
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockResponseLog {
        rows: Mutex<Vec<SheetRow>>,
        fail: bool,
    }

    impl MockResponseLog {
        pub fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        pub fn rows(&self) -> Vec<SheetRow> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResponseLog for MockResponseLog {
        async fn append(&self, row: &SheetRow) -> Result<(), SheetError> {
            self.rows.lock().unwrap().push(row.clone());
            if self.fail {
                return Err(SheetError::Status(503));
            }
            Ok(())
        }
    }
}
