// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{codebit, temp_files, FakeTransport, ScriptedPrompter};

use anyhow::Result;
use codebit::{
    fetch::{FetchError, Fetcher},
    metadata::ValidationError,
    sync::{RetrieveOutcome, Summary, SyncError, Syncer},
    version::Version,
};
use pretty_assertions::assert_eq;
use std::fs::{read_to_string, write};

const URL: &str = "https://example.org/raw/Example.cs";

fn syncer(transport: FakeTransport) -> Syncer<FakeTransport, ScriptedPrompter> {
    Syncer::new(Fetcher::new(transport), ScriptedPrompter::default())
}

#[tokio::test]
async fn retrieve_names_file_after_master_copy() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let remote = codebit("Example.cs", "1.0", URL);
    let syncer = syncer(FakeTransport::new().serve(URL, remote.as_str()));

    let result = syncer.retrieve(URL, dir.path()).await?;
    let expect = RetrieveOutcome::Retrieved {
        path: dir.path().join("Example.cs"),
        version: Version::from("1.0"),
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(dir.path().join("Example.cs"))?, remote);
    assert!(syncer.prompter().questions.is_empty());
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn retrieve_never_overwrites_existing_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Example.cs");
    write(&path, "class Mine {}\n")?;
    let syncer = syncer(FakeTransport::new().serve(URL, codebit("Example.cs", "2.0", URL)));

    let result = syncer.retrieve(URL, dir.path()).await?;
    let expect = RetrieveOutcome::DestinationExists { path: path.clone() };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, "class Mine {}\n");
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn retrieve_rejects_master_copy_without_name() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let body = format!("---\nurl: {URL}\nversion: 1.0\nkeywords: CodeBit\n...\n");
    let syncer = syncer(FakeTransport::new().serve(URL, body));

    let result = syncer.retrieve(URL, dir.path()).await;

    assert_eq!(
        result.err().and_then(|err| err.validation()),
        Some(ValidationError::MissingName)
    );
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn retrieve_rejects_name_escaping_target_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("target");
    std::fs::create_dir(&target)?;
    let syncer = syncer(FakeTransport::new().serve(URL, codebit("../Escape.cs", "1.0", URL)));

    let result = syncer.retrieve(URL, &target).await;

    assert!(matches!(result, Err(SyncError::UnsafeName(ref name)) if name == "../Escape.cs"));
    assert!(!dir.path().join("Escape.cs").exists());
    assert!(temp_files(&target)?.is_empty());

    Ok(())
}

#[tokio::test]
async fn retrieve_reports_fetch_failure() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let syncer = syncer(FakeTransport::new());

    let result = syncer.retrieve(URL, dir.path()).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Transport {
            status: Some(404),
            ..
        }))
    ));
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn retrieve_all_continues_past_failures() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path().join("Taken.cs"), "class Taken {}\n")?;
    let transport = FakeTransport::new()
        .serve(
            "https://example.org/Fresh.cs",
            codebit("Fresh.cs", "1.0", "https://example.org/Fresh.cs"),
        )
        .serve(
            "https://example.org/Taken.cs",
            codebit("Taken.cs", "1.0", "https://example.org/Taken.cs"),
        )
        .fail("https://example.org/Gone.cs", 410, "Gone");
    let syncer = syncer(transport.clone());

    let result = syncer
        .retrieve_all(
            [
                "https://example.org/Gone.cs",
                "https://example.org/Fresh.cs",
                "https://example.org/Taken.cs",
            ],
            dir.path(),
        )
        .await;
    let expect = Summary {
        retrieved: 1,
        skipped: 1,
        failed: 1,
        ..Summary::default()
    };

    assert_eq!(result, expect);
    assert_eq!(transport.requests().len(), 3);
    assert!(dir.path().join("Fresh.cs").exists());
    assert_eq!(read_to_string(dir.path().join("Taken.cs"))?, "class Taken {}\n");
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}
