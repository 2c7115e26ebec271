use serde::Serialize;

use hrflow_core::config::{AppConfig, LoadOptions};
use hrflow_db::connect_with_settings;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

pub fn run(json: bool) -> CommandResult {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "ok",
                detail: format!("database url `{}`", config.database.url),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "failed",
                detail: error.to_string(),
            });
            None
        }
    };

    if let Some(config) = config {
        let probe: Result<(), String> =
            match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(async {
                    let pool = connect_with_settings(
                        &config.database.url,
                        config.database.max_connections,
                        config.database.timeout_secs,
                    )
                    .await
                    .map_err(|error| error.to_string())?;
                    sqlx::query_scalar::<_, i64>("SELECT 1")
                        .fetch_one(&pool)
                        .await
                        .map_err(|error| error.to_string())?;
                    pool.close().await;
                    Ok(())
                }),
                Err(error) => Err(format!("failed to initialize async runtime: {error}")),
            };

        checks.push(match probe {
            Ok(()) => DoctorCheck {
                name: "database",
                status: "ok",
                detail: "connectivity probe succeeded".to_string(),
            },
            Err(message) => DoctorCheck { name: "database", status: "failed", detail: message },
        });
    }

    let healthy = checks.iter().all(|check| check.status == "ok");
    let report = DoctorReport { status: if healthy { "ok" } else { "failed" }, checks };

    let output = if json {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| error.to_string())
    } else {
        let mut lines = vec![format!("doctor: {}", report.status)];
        for check in &report.checks {
            lines.push(format!("  {} [{}] {}", check.name, check.status, check.detail));
        }
        lines.join("\n")
    };

    CommandResult { exit_code: u8::from(!healthy), output }
}
