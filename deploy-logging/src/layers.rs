// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    appender,
    error::{Error, Result},
    LogFormat, LogOutputDest,
};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::{Event, Level, Subscriber};
use tracing_subscriber::{
    filter::Targets,
    fmt::{
        self as tracing_fmt,
        format::Writer,
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields,
    },
    layer::Filter,
    registry::LookupSpan,
    reload::{self, Handle},
    Layer, Registry,
};

/// Environment variable overriding the default logging targets, e.g. `DEPLOY_LOG=deploy_evm=trace`.
pub const LOG_ENV_VAR: &str = "DEPLOY_LOG";

const ALL_KEYWORD: &str = "all";
const ALL_TARGETS: [&str; 3] = ["deploy", "deploy_evm", "deploy_logging"];

/// Handle that implements functions to change the log level on the fly.
pub struct ReloadHandle(pub(crate) Handle<Box<dyn Filter<Registry> + Send + Sync>, Registry>);

impl ReloadHandle {
    /// Modify the log level to the provided CSV value
    /// Example input: `deploy_evm=DEBUG,alloy=WARN`
    ///
    /// Custom keywords will take less precedence if the same target has been manually specified in the CSV.
    /// I.e., if you have `all,deploy_evm=INFO`, then deploy_evm will be set to INFO.
    pub fn modify_log_level(&self, logging_value: &str) -> Result<()> {
        let targets: Vec<(String, Level)> = get_logging_targets(logging_value)?;
        self.0.modify(|old_filter| {
            let new_filter: Box<dyn Filter<Registry> + Send + Sync> =
                Box::new(Targets::new().with_targets(targets));
            *old_filter = new_filter;
        })?;

        Ok(())
    }
}

#[derive(Default)]
/// Tracing log formatter setup for easier span viewing
pub(crate) struct LogFormatter;

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        // Write level and target
        let level = *event.metadata().level();
        let module = event.metadata().module_path().unwrap_or("<unknown module>");
        let lno = event.metadata().line().unwrap_or(0);

        write!(writer, "[")?;
        SystemTime.format_time(&mut writer)?;
        write!(writer, " {level} {module} {lno}")?;

        // Print the full span tree, outermost first
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "/{}", span.name())?;
            }
        }

        write!(writer, "] ")?;

        // Add the log message and any fields associated with the event
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[derive(Default)]
pub(crate) struct TracingLayers {
    pub(crate) layers: Vec<Box<dyn Layer<Registry> + Send + Sync>>,
    pub(crate) log_appender_guard: Option<WorkerGuard>,
}

impl TracingLayers {
    pub(crate) fn fmt_layer(
        &mut self,
        default_logging_targets: Vec<(String, Level)>,
        output_dest: &LogOutputDest,
        format: LogFormat,
        max_log_files: Option<usize>,
        print_updates_to_stdout: bool,
    ) -> Result<ReloadHandle> {
        let layer = match output_dest {
            LogOutputDest::Stdout => {
                if print_updates_to_stdout {
                    println!("Logging to stdout");
                }
                match format {
                    LogFormat::Json => tracing_fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_writer(std::io::stdout)
                        .boxed(),
                    LogFormat::Default => tracing_fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .event_format(LogFormatter)
                        .with_writer(std::io::stdout)
                        .boxed(),
                }
            }
            LogOutputDest::Stderr => match format {
                LogFormat::Json => tracing_fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr)
                    .boxed(),
                LogFormat::Default => tracing_fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .event_format(LogFormatter)
                    .with_writer(std::io::stderr)
                    .boxed(),
            },
            LogOutputDest::Path(path) => {
                std::fs::create_dir_all(path)?;
                if print_updates_to_stdout {
                    println!("Logging to directory: {path:?}");
                }

                let (file_rotation, worker_guard) = appender::file_rotater(path, max_log_files)?;
                self.log_appender_guard = Some(worker_guard);

                match format {
                    LogFormat::Json => tracing_fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_writer(file_rotation)
                        .boxed(),
                    LogFormat::Default => tracing_fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .event_format(LogFormatter)
                        .with_writer(file_rotation)
                        .boxed(),
                }
            }
        };

        let targets = match std::env::var(LOG_ENV_VAR) {
            Ok(value) => {
                let targets = get_logging_targets(&value)?;
                if print_updates_to_stdout {
                    println!("{LOG_ENV_VAR} is set, overriding the default log targets");
                }
                targets
            }
            Err(_) => default_logging_targets,
        };

        let target_filters: Box<dyn Filter<Registry> + Send + Sync> =
            Box::new(Targets::new().with_targets(targets));
        let (filter, reload_handle) = reload::Layer::new(target_filters);

        let layer = layer.with_filter(filter);
        self.layers.push(Box::new(layer));

        Ok(ReloadHandle(reload_handle))
    }
}

/// Parses the logging targets from the env variable (DEPLOY_LOG). The crates should be given as a CSV, for e.g.,
/// `export DEPLOY_LOG = deploy_evm=WARN,deploy=TRACE`
///
/// The keyword `all` expands to TRACE for every crate of the deployer. Explicit targets win over it.
pub(crate) fn get_logging_targets(logging_env_value: &str) -> Result<Vec<(String, Level)>> {
    let mut t = std::collections::BTreeMap::new();
    let mut explicit = Vec::new();

    for crate_log_level in logging_env_value.split(',').map(str::trim) {
        if crate_log_level.is_empty() {
            continue;
        }

        if crate_log_level == ALL_KEYWORD {
            for target in ALL_TARGETS {
                let _ = t.entry(target.to_string()).or_insert(Level::TRACE);
            }
            continue;
        }

        let (crate_name, log_level) = crate_log_level.split_once('=').ok_or_else(|| {
            Error::LoggingConfiguration(format!(
                "Expected <crate>=<level> or {ALL_KEYWORD:?}, got {crate_log_level:?}"
            ))
        })?;
        explicit.push((crate_name.to_string(), get_log_level_from_str(log_level)?));
    }

    // explicit targets override the keyword defaults
    for (crate_name, level) in explicit {
        let _ = t.insert(crate_name, level);
    }

    Ok(t.into_iter().collect())
}

fn get_log_level_from_str(log_level: &str) -> Result<Level> {
    Level::from_str(log_level.trim()).map_err(|_| {
        Error::LoggingConfiguration(format!(
            "Log level {log_level:?} is not supported, use one of TRACE, DEBUG, INFO, WARN or ERROR"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_test::internal::{global_buf, MockWriter};

    fn read_logs(dir: &std::path::Path) -> Result<String> {
        let mut contents = String::new();
        for entry in std::fs::read_dir(dir)? {
            contents.push_str(&std::fs::read_to_string(entry?.path())?);
        }
        Ok(contents)
    }

    #[test]
    fn env_override_and_reload_drive_the_file_layer() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::env::set_var(LOG_ENV_VAR, "deploy_logging=warn");

        let mut layers = TracingLayers::default();
        let reload_handle = layers.fmt_layer(
            vec![("deploy_logging".to_string(), Level::TRACE)],
            &LogOutputDest::Path(dir.path().to_path_buf()),
            LogFormat::Default,
            Some(2),
            false,
        );
        std::env::remove_var(LOG_ENV_VAR);
        let reload_handle = reload_handle?;

        let guard = layers.log_appender_guard.take();
        let subscriber = tracing_subscriber::registry().with(layers.layers);
        tracing::subscriber::with_default(subscriber, || -> Result<()> {
            tracing::info!("dropped by the env override");
            tracing::warn!("kept by the env override");
            reload_handle.modify_log_level("deploy_logging=info")?;
            tracing::info!("kept after the reload");
            Ok(())
        })?;
        // flushes the non-blocking writer
        drop(guard);

        let logs = read_logs(dir.path())?;
        assert!(!logs.contains("dropped by the env override"), "{logs}");
        assert!(logs.contains("kept by the env override"), "{logs}");
        assert!(logs.contains("kept after the reload"), "{logs}");
        assert!(logs.contains(" WARN deploy_logging::layers::tests "), "{logs}");
        Ok(())
    }

    #[test]
    fn formatter_prints_the_span_tree_outermost_first() -> Result<()> {
        let layer = tracing_fmt::layer()
            .with_ansi(false)
            .event_format(LogFormatter)
            .with_writer(MockWriter::new(global_buf()));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            let deployment = tracing::info_span!("deployment");
            let _deployment = deployment.enter();
            let confirmation = tracing::info_span!("confirmation");
            let _confirmation = confirmation.enter();
            tracing::info!(block = 7, "receipt received");
        });

        let buf = global_buf()
            .lock()
            .map_err(|_| color_eyre::eyre::eyre!("log buffer poisoned"))?;
        let logs = std::str::from_utf8(&buf)?;
        let line = logs
            .lines()
            .find(|line| line.contains("receipt received"))
            .ok_or_else(|| color_eyre::eyre::eyre!("event not logged: {logs}"))?;
        assert!(line.starts_with('['), "{line}");
        assert!(
            line.contains(" INFO deploy_logging::layers::tests "),
            "{line}"
        );
        assert!(line.contains("/deployment/confirmation] "), "{line}");
        assert!(line.contains("block=7"), "{line}");
        Ok(())
    }

    #[test]
    fn explicit_targets_override_the_all_keyword() {
        let targets = get_logging_targets("all,deploy_evm=info,alloy=warn").expect("valid");
        assert_eq!(
            targets,
            vec![
                ("alloy".to_string(), Level::WARN),
                ("deploy".to_string(), Level::TRACE),
                ("deploy_evm".to_string(), Level::INFO),
                ("deploy_logging".to_string(), Level::TRACE),
            ]
        );
    }

    #[test]
    fn malformed_targets_are_rejected() {
        assert!(matches!(
            get_logging_targets("deploy_evm"),
            Err(Error::LoggingConfiguration(_))
        ));
        assert!(matches!(
            get_logging_targets("deploy_evm=loud"),
            Err(Error::LoggingConfiguration(_))
        ));
    }
}
