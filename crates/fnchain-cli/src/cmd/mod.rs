pub mod check;
pub mod completions;
pub mod serialize;

use std::path::Path;

use fnchain_core::config::{ProjectConfig, load_project_config};
use fnchain_core::error::{ErrorCode, FnchainError};
use fnchain_core::store::BackendConfig;

use crate::output::{CliError, OutputMode, render_error};

/// Render a core error to stderr and hand it back as the command's failure.
fn fail(output: OutputMode, err: impl Into<FnchainError>) -> anyhow::Error {
    let err = err.into();
    if let Err(render_err) = render_error(output, &CliError::from(&err)) {
        return render_err;
    }
    anyhow::Error::new(err)
}

/// Load `.fnchain.toml` under `project_root`, rendering parse failures.
fn load_project(output: OutputMode, project_root: &Path) -> anyhow::Result<ProjectConfig> {
    load_project_config(project_root).map_err(|err| {
        let code = ErrorCode::ProjectConfigError;
        let cli = CliError::with_details(
            format!("{err:#}"),
            code.hint().unwrap_or(code.message()),
            code.code(),
        );
        if let Err(render_err) = render_error(output, &cli) {
            return render_err;
        }
        err
    })
}

fn load_backend(output: OutputMode, path: &Path) -> anyhow::Result<BackendConfig> {
    BackendConfig::load(path).map_err(|err| fail(output, err))
}
