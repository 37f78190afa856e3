//! Unit tests for the publisher invocation.

use super::*;
use crate::test_utils::{StubExecutor, output_with};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Site {
    _temp: TempDir,
    dir: Utf8PathBuf,
}

#[fixture]
fn site() -> Site {
    let temp = TempDir::new().expect("temp dir");
    let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 temp dir");
    Site { _temp: temp, dir }
}

#[rstest]
#[case::unix_absolute("/tmp/site", "file:/tmp/site")]
#[case::windows_drive("C:\\Users\\me\\site", "file:/C:/Users/me/site")]
#[case::relative("site", "file:/site")]
fn file_uri_formats_paths(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(file_uri(Utf8Path::new(path)), expected);
}

#[test]
fn invocation_args_follow_publisher_contract() {
    let invocation = PublisherInvocation {
        launcher: Utf8Path::new("/eclipse/plugins/launcher.jar"),
        staging_dir: Utf8Path::new("/tmp/site"),
        configuration_dir: Utf8Path::new("/tmp/config"),
    };

    assert_eq!(
        invocation.args(),
        [
            "-jar",
            "/eclipse/plugins/launcher.jar",
            "-application",
            "org.eclipse.equinox.p2.publisher.FeaturesAndBundlesPublisher",
            "-metadataRepository",
            "file:/tmp/site",
            "-artifactRepository",
            "file:/tmp/site",
            "-configuration",
            "/tmp/config",
            "-source",
            "/tmp/site",
            "-compress",
            "-publishArtifacts",
        ]
    );
}

#[rstest]
fn publish_runs_runtime_with_fresh_configuration_dir(site: Site) {
    let mut executor = MockCommandExecutor::new();
    let staging = site.dir.clone();
    executor
        .expect_run()
        .withf(move |cmd, args| {
            let configuration = args
                .iter()
                .position(|arg| *arg == "-configuration")
                .and_then(|index| args.get(index + 1));
            cmd == "/opt/jdk/bin/java"
                && args.first() == Some(&"-jar")
                && args.get(1) == Some(&"launcher.jar")
                && args.contains(&staging.as_str())
                && configuration.is_some_and(|dir| Utf8Path::new(dir).is_dir())
        })
        .times(1)
        .returning(|_, _| Ok(output_with(0, b"")));

    let publisher = Publisher::new(&executor, "/opt/jdk/bin/java", Utf8Path::new("launcher.jar"));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    publisher
        .publish(&site.dir, &mut stdout, &mut stderr)
        .expect("publish succeeds");

    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
}

#[rstest]
fn successful_publish_removes_configuration_dir_and_keeps_site(site: Site) {
    let executor = StubExecutor::succeeding()
        .with_published_file("content.jar", b"metadata")
        .with_log("logs/run.log", "ignored on success");
    let publisher = Publisher::new(&executor, "java", Utf8Path::new("launcher.jar"));

    publisher
        .publish(&site.dir, &mut Vec::new(), &mut Vec::new())
        .expect("publish succeeds");

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let configuration = calls[0].value_of("-configuration").expect("configuration arg");
    assert!(!Utf8Path::new(configuration).exists());
    assert_eq!(
        fs::read(site.dir.join("content.jar")).expect("published file"),
        b"metadata"
    );
}

#[rstest]
fn failed_publish_echoes_output_and_logs(site: Site) {
    let executor = StubExecutor::failing(3)
        .with_stdout(b"!ENTRY org.eclipse.equinox.p2\n")
        .with_log("org.eclipse.osgi/1234.log", "missing bundle")
        .with_log("notes.txt", "not a log");
    let publisher = Publisher::new(&executor, "java", Utf8Path::new("launcher.jar"));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let err = publisher
        .publish(&site.dir, &mut stdout, &mut stderr)
        .expect_err("publisher failure propagates");

    assert!(matches!(err, SiteBuilderError::PublisherFailed { code: 3 }));
    assert_eq!(stdout, b"!ENTRY org.eclipse.equinox.p2\n");
    let stderr = String::from_utf8(stderr).expect("utf-8 stderr");
    assert!(stderr.contains("Log 1234.log: missing bundle"));
    assert!(!stderr.contains("not a log"));
}

#[rstest]
fn unreadable_logs_do_not_mask_publisher_exit_code(site: Site) {
    let executor = StubExecutor::failing(3)
        .with_log("org.eclipse.osgi/1234.log", "missing bundle")
        .removing_dirs();
    let publisher = Publisher::new(&executor, "java", Utf8Path::new("launcher.jar"));
    let mut stderr = Vec::new();

    let err = publisher
        .publish(&site.dir, &mut Vec::new(), &mut stderr)
        .expect_err("publisher failure propagates");

    assert!(matches!(err, SiteBuilderError::PublisherFailed { code: 3 }));
    assert_eq!(err.exit_code(), 3);
    let stderr = String::from_utf8(stderr).expect("utf-8 stderr");
    assert!(stderr.contains("warning: could not read publisher logs"));
}

#[rstest]
#[case::success(StubExecutor::succeeding())]
#[case::failure(StubExecutor::failing(2))]
fn captured_stderr_is_forwarded(#[case] executor: StubExecutor, site: Site) {
    let executor = executor.with_stderr(b"WARNING: illegal reflective access\n");
    let publisher = Publisher::new(&executor, "java", Utf8Path::new("launcher.jar"));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let _result = publisher.publish(&site.dir, &mut stdout, &mut stderr);

    assert!(stdout.is_empty());
    assert_eq!(stderr, b"WARNING: illegal reflective access\n");
}

#[rstest]
fn launch_failure_is_an_io_error(site: Site) {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_run()
        .times(1)
        .returning(|_, _| Err(std::io::Error::from(std::io::ErrorKind::NotFound).into()));
    let publisher = Publisher::new(&executor, "missing-java", Utf8Path::new("launcher.jar"));

    let err = publisher
        .publish(&site.dir, &mut Vec::new(), &mut Vec::new())
        .expect_err("spawn failure propagates");

    assert!(matches!(err, SiteBuilderError::Io(_)));
    assert_eq!(err.exit_code(), 1);
}

#[rstest]
fn collect_diagnostic_logs_walks_recursively_in_order(site: Site) {
    fs::create_dir_all(site.dir.join("b/nested")).expect("mkdir");
    fs::write(site.dir.join("b/nested/z.log"), "zulu").expect("write");
    fs::write(site.dir.join("a.log"), "alpha").expect("write");
    fs::write(site.dir.join("config.ini"), "osgi").expect("write");

    let logs = collect_diagnostic_logs(&site.dir).expect("walk succeeds");

    let names: Vec<_> = logs.iter().map(DiagnosticLog::file_name).collect();
    assert_eq!(names, ["a.log", "z.log"]);
    assert_eq!(logs[1].contents, "zulu");
}
