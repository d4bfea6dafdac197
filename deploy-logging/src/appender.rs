// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.
use crate::error::Result;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const LOG_FILE_PREFIX: &str = "deploy";
const LOG_FILE_SUFFIX: &str = "log";
const DEFAULT_MAX_LOG_FILES: usize = 10;

/// Writes logs to hourly rotated files inside `dir`, keeping at most `max_log_files` of them.
///
/// The returned guard flushes the background writer when dropped, so it must be held for the
/// life of the program.
pub(crate) fn file_rotater(
    dir: &Path,
    max_log_files: Option<usize>,
) -> Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(max_log_files.unwrap_or(DEFAULT_MAX_LOG_FILES))
        .build(dir)?;

    Ok(tracing_appender::non_blocking(appender))
}
