// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{codebit, temp_files, FakeTransport, ScriptedPrompter};

use anyhow::Result;
use codebit::{
    fetch::{FetchError, Fetcher},
    metadata::ValidationError,
    sync::{CheckOutcome, Comparison, Origin, Summary, SyncError, Syncer, UpdateOutcome},
    version::Version,
};
use pretty_assertions::assert_eq;
use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};
use tempfile::TempDir;

const URL: &str = "https://example.org/Example.cs";

fn local_codebit(version: &str) -> Result<(TempDir, PathBuf, String)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Example.cs");
    let content = codebit("Example.cs", version, URL);
    write(&path, &content)?;

    Ok((dir, path, content))
}

fn syncer(transport: FakeTransport, answers: &[bool]) -> Syncer<FakeTransport, ScriptedPrompter> {
    Syncer::new(
        Fetcher::new(transport),
        ScriptedPrompter::new(answers.iter().copied()),
    )
}

#[tokio::test]
async fn update_applies_newer_master_copy_on_confirmation() -> Result<()> {
    let (dir, path, _) = local_codebit("1.4")?;
    let remote = codebit("Example.cs", "1.5", URL);
    let transport = FakeTransport::new().serve(URL, remote.as_str());
    let mut syncer = syncer(transport.clone(), &[true]);

    let result = syncer.update(&path).await?;
    let expect = UpdateOutcome::Updated {
        from: Version::from("1.4"),
        to: Version::from("1.5"),
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, remote);
    assert_eq!(transport.requests(), vec![URL.to_string()]);
    assert_eq!(syncer.prompter().questions.len(), 1);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_leaves_equal_version_untouched() -> Result<()> {
    let (dir, path, local) = local_codebit("2.0")?;
    let transport = FakeTransport::new().serve(URL, codebit("Example.cs", "2.0", URL));
    let mut syncer = syncer(transport, &[]);

    let result = syncer.update(&path).await?;
    let expect = UpdateOutcome::UpToDate {
        version: Version::from("2.0"),
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, local);
    assert!(syncer.prompter().questions.is_empty());
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_reports_local_copy_newer_than_master() -> Result<()> {
    let (dir, path, local) = local_codebit("3.0")?;
    let transport = FakeTransport::new().serve(URL, codebit("Example.cs", "1.0", URL));
    let mut syncer = syncer(transport, &[]);

    let result = syncer.update(&path).await?;
    let expect = UpdateOutcome::LocalNewer {
        local: Version::from("3.0"),
        remote: Version::from("1.0"),
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, local);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_declined_keeps_local_copy() -> Result<()> {
    let (dir, path, local) = local_codebit("1.8.5")?;
    let transport = FakeTransport::new().serve(URL, codebit("Example.cs", "1.30.5", URL));
    let mut syncer = syncer(transport, &[false]);

    let result = syncer.update(&path).await?;
    let expect = UpdateOutcome::Declined {
        local: Version::from("1.8.5"),
        remote: Version::from("1.30.5"),
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, local);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_prompt_failure_keeps_local_copy() -> Result<()> {
    let (dir, path, local) = local_codebit("1.0")?;
    let transport = FakeTransport::new().serve(URL, codebit("Example.cs", "1.1", URL));
    let mut syncer = syncer(transport, &[]);

    let result = syncer.update(&path).await;

    assert!(matches!(result, Err(SyncError::Prompt(_))));
    assert_eq!(read_to_string(&path)?, local);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_fetch_failure_keeps_local_copy() -> Result<()> {
    let (dir, path, local) = local_codebit("1.0")?;
    let transport = FakeTransport::new().fail(URL, 503, "Service Unavailable");
    let mut syncer = syncer(transport, &[true]);

    let result = syncer.update(&path).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Transport {
            status: Some(503),
            ..
        }))
    ));
    assert_eq!(read_to_string(&path)?, local);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_interrupted_download_keeps_local_copy() -> Result<()> {
    let (dir, path, local) = local_codebit("1.0")?;
    let transport =
        FakeTransport::new().serve(URL, format!("#partial\n{}", codebit("Example.cs", "9", URL)));
    let mut syncer = syncer(transport, &[true]);

    let result = syncer.update(&path).await;

    assert!(matches!(
        result,
        Err(SyncError::Fetch(FetchError::Transport { status: None, .. }))
    ));
    assert_eq!(read_to_string(&path)?, local);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_rejects_master_copy_that_is_not_a_codebit() -> Result<()> {
    let (dir, path, local) = local_codebit("1.0")?;
    let transport = FakeTransport::new().serve(URL, "---\nname: Example.cs\nversion: 2.0\n...\n");
    let mut syncer = syncer(transport, &[true]);

    let result = syncer.update(&path).await;

    assert!(matches!(
        result,
        Err(SyncError::Validation {
            source: ValidationError::NotACodeBit,
            origin: Origin::Remote(ref url),
        }) if url == URL
    ));
    assert_eq!(read_to_string(&path)?, local);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_rejects_local_file_without_metadata_before_fetching() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Plain.cs");
    write(&path, "class Plain {}\n")?;
    let transport = FakeTransport::new();
    let mut syncer = syncer(transport.clone(), &[true]);

    let result = syncer.update(&path).await;

    assert!(matches!(result, Err(SyncError::Syntax { .. })));
    assert!(transport.requests().is_empty());

    Ok(())
}

#[tokio::test]
async fn update_rejects_local_codebit_without_version() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Example.cs");
    write(&path, format!("---\nurl: {URL}\nkeywords: CodeBit\n...\n"))?;
    let mut syncer = syncer(FakeTransport::new(), &[true]);

    let result = syncer.update(&path).await;

    assert_eq!(
        result.err().and_then(|err| err.validation()),
        Some(ValidationError::MissingVersion)
    );

    Ok(())
}

#[tokio::test]
async fn update_all_continues_past_failures() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let plain = dir.path().join("Plain.cs");
    write(&plain, "---\nname: Plain.cs\n...\n")?;
    let broken = dir.path().join("Broken.cs");
    write(&broken, codebit("Broken.cs", "1.0", "https://example.org/Broken.cs"))?;
    let current = dir.path().join("Current.cs");
    write(&current, codebit("Current.cs", "1.0", "https://example.org/Current.cs"))?;
    let stale = dir.path().join("Stale.cs");
    write(&stale, codebit("Stale.cs", "1.0", "https://example.org/Stale.cs"))?;

    let transport = FakeTransport::new()
        .serve(
            "https://example.org/Current.cs",
            codebit("Current.cs", "1.0", "https://example.org/Current.cs"),
        )
        .serve(
            "https://example.org/Stale.cs",
            codebit("Stale.cs", "1.1", "https://example.org/Stale.cs"),
        );
    let mut syncer = syncer(transport.clone(), &[true]);

    let result = syncer.update_all([&broken, &current, &plain, &stale]).await;
    let expect = Summary {
        updated: 1,
        up_to_date: 1,
        skipped: 1,
        failed: 1,
        ..Summary::default()
    };

    assert_eq!(result, expect);
    assert_eq!(
        transport.requests(),
        vec![
            "https://example.org/Broken.cs".to_string(),
            "https://example.org/Current.cs".to_string(),
            "https://example.org/Stale.cs".to_string(),
        ]
    );
    assert!(read_to_string(&stale)?.contains("version: 1.1"));
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn check_never_prompts_or_mutates() -> Result<()> {
    let (dir, path, local) = local_codebit("1.4")?;
    let transport = FakeTransport::new().serve(URL, codebit("Example.cs", "1.5", URL));
    let syncer = syncer(transport, &[]);

    let result = syncer.check(&path).await?;
    let expect = CheckOutcome {
        local: Version::from("1.4"),
        remote: Version::from("1.5"),
        comparison: Comparison::RemoteNewer,
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, local);
    assert!(syncer.prompter().questions.is_empty());
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_follows_master_copy_that_moved() -> Result<()> {
    let (dir, path, _) = local_codebit("1.0")?;
    let moved = "https://example.org/moved/Example.cs";
    let remote = codebit("Example.cs", "1.1", moved);
    let transport = FakeTransport::new().serve(URL, remote.as_str());
    let mut syncer = syncer(transport.clone(), &[true]);

    let result = syncer.update(&path).await?;
    let expect = UpdateOutcome::Updated {
        from: Version::from("1.0"),
        to: Version::from("1.1"),
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&path)?, remote);
    assert_eq!(transport.requests(), vec![URL.to_string()]);
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}

#[tokio::test]
async fn check_all_tallies_without_changing_anything() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let plain = dir.path().join("Plain.cs");
    write(&plain, "---\nname: Plain.cs\n...\n")?;
    let current = dir.path().join("Current.cs");
    let current_content = codebit("Current.cs", "2.0", "https://example.org/Current.cs");
    write(&current, &current_content)?;
    let stale = dir.path().join("Stale.cs");
    let stale_content = codebit("Stale.cs", "1.0", "https://example.org/Stale.cs");
    write(&stale, &stale_content)?;

    let transport = FakeTransport::new()
        .serve(
            "https://example.org/Current.cs",
            codebit("Current.cs", "2.0", "https://example.org/Current.cs"),
        )
        .serve(
            "https://example.org/Stale.cs",
            codebit("Stale.cs", "1.1", "https://example.org/Stale.cs"),
        );
    let syncer = syncer(transport, &[]);

    let result = syncer.check_all([&current, &plain, &stale]).await;
    let expect = Summary {
        outdated: 1,
        up_to_date: 1,
        skipped: 1,
        ..Summary::default()
    };

    assert_eq!(result, expect);
    assert_eq!(read_to_string(&current)?, current_content);
    assert_eq!(read_to_string(&stale)?, stale_content);
    assert!(syncer.prompter().questions.is_empty());
    assert!(temp_files(dir.path())?.is_empty());

    Ok(())
}
