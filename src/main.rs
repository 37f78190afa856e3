//! p2 site builder CLI entrypoint.
//!
//! This binary assembles a zipped Eclipse p2 update site. A failing
//! publisher's exit status becomes this process's exit status.

use clap::Parser;
use p2_site_builder::cli::Cli;
use p2_site_builder::config::SiteConfig;
use p2_site_builder::descriptor::{SITE_XML, SiteDescriptor};
use p2_site_builder::error::Result;
use p2_site_builder::output::{success_message, write_stderr_line};
use p2_site_builder::pipeline::build_site;
use p2_site_builder::publisher::SystemCommandExecutor;
use p2_site_builder::stager::{FEATURES_DIR, PLUGINS_DIR};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let config = SiteConfig::try_from(cli)?;

    if cli.dry_run {
        return run_dry(&config, stderr);
    }

    let report = build_site(&config, &SystemCommandExecutor, stdout, stderr)?;
    if !config.quiet {
        write_stderr_line(stderr, success_message(report.entries, &report.output));
    }
    Ok(())
}

/// Prints the descriptor and planned layout without touching the filesystem.
fn run_dry(config: &SiteConfig, stderr: &mut dyn Write) -> Result<()> {
    let descriptor = SiteDescriptor::from_config(config)?;

    write_stderr_line(stderr, "Dry run - no files will be written");
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format!("Output: {}", config.output));
    write_stderr_line(
        stderr,
        format!("Publisher: {} -jar {}", config.java, config.eclipse_launcher),
    );
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, "Site layout:");
    write_stderr_line(stderr, format!("  {SITE_XML}"));
    for feature in &config.features {
        write_stderr_line(
            stderr,
            format!(
                "  {FEATURES_DIR}/{} <- {}",
                feature.file_name().unwrap_or_default(),
                feature.path
            ),
        );
    }
    for bundle in &config.bundles {
        write_stderr_line(
            stderr,
            format!(
                "  {PLUGINS_DIR}/{} <- {bundle}",
                bundle.file_name().unwrap_or_default()
            ),
        );
    }
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format!("{SITE_XML}:"));
    write_stderr_line(stderr, descriptor.to_xml()?.trim_end());
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p2_site_builder::error::SiteBuilderError;
    use rstest::rstest;

    fn cli(extra: &[&str]) -> Cli {
        let base = [
            "p2-site-builder",
            "--output",
            "site.zip",
            "--name",
            "Site",
            "--url",
            "https://example.com",
            "--description",
            "Desc",
            "--eclipse-launcher",
            "launcher.jar",
        ];
        Cli::parse_from(base.iter().chain(extra.iter()))
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(()), &mut stderr), 0);
        assert!(stderr.is_empty());
    }

    #[rstest]
    #[case::publisher(SiteBuilderError::PublisherFailed { code: 3 }, 3)]
    #[case::staging(SiteBuilderError::StagingFailed { reason: "disk full".to_owned() }, 1)]
    fn exit_code_for_run_result_reports_error(#[case] err: SiteBuilderError, #[case] code: i32) {
        let expected_message = err.to_string();
        let mut stderr = Vec::new();

        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), code);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains(&expected_message));
    }

    #[test]
    fn dry_run_prints_layout_and_descriptor() {
        let cli = cli(&[
            "--feature",
            "out/feature.jar",
            "--feature-id",
            "com.example",
            "--feature-version",
            "1.0.0",
            "--bundle",
            "out/plugin.jar",
            "--dry-run",
        ]);
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        run(&cli, &mut stdout, &mut stderr).expect("dry run succeeds");

        let text = String::from_utf8(stderr).expect("utf-8");
        assert!(text.contains("features/feature.jar <- out/feature.jar"));
        assert!(text.contains("plugins/plugin.jar <- out/plugin.jar"));
        assert!(text.contains("url=\"feature/feature.jar\""));
        assert!(stdout.is_empty());
    }

    #[test]
    fn mismatched_features_fail_before_dry_run_output() {
        let cli = cli(&["--feature", "a.jar", "--dry-run"]);
        let mut stderr = Vec::new();

        let err = run(&cli, &mut Vec::new(), &mut stderr).expect_err("mismatch fails");

        assert!(matches!(err, SiteBuilderError::FeatureListMismatch { .. }));
        assert!(stderr.is_empty());
    }
}
