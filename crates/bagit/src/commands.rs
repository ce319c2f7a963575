use std::path::Path;

use anyhow::{Context, Result};
use bagit_core::{Bag, BagBuilder, BagVerifier, read};

use crate::cli::{BagArg, CheckArg, CreateArg};

pub fn create(arg: CreateArg) -> Result<()> {
    let builder = arg.metadata.iter().fold(
        BagBuilder::new()
            .version(arg.bagit_version)
            .encoding(arg.encoding)
            .algorithms(&arg.algorithms)
            .include_hidden(arg.include_hidden),
        |builder, (key, value)| builder.metadata(key, value),
    );

    let bag = builder
        .bag_in_place(&arg.dir)
        .with_context(|| format!("Failed to create bag in '{}'", arg.dir.display()))?;

    println!("{}", summary(&bag));
    Ok(())
}

pub fn verify(arg: CheckArg) -> Result<()> {
    let bag = load(&arg.dir)?;
    BagVerifier::new()
        .verify_complete(&bag, arg.ignore_hidden)
        .with_context(|| format!("'{}' is not complete", arg.dir.display()))?;
    println!("{} is complete", arg.dir.display());
    Ok(())
}

pub fn validate(arg: CheckArg) -> Result<()> {
    let bag = load(&arg.dir)?;
    BagVerifier::new()
        .verify_valid(&bag, arg.ignore_hidden)
        .with_context(|| format!("'{}' is not valid", arg.dir.display()))?;
    println!("{} is valid", arg.dir.display());
    Ok(())
}

pub fn quick(arg: BagArg) -> Result<()> {
    let bag = load(&arg.dir)?;
    let verifier = BagVerifier::new();
    if !verifier.can_quickly_verify(&bag) {
        tracing::warn!(bag = %arg.dir.display(), "no usable Payload-Oxum");
    }
    verifier
        .quickly_verify(&bag)
        .with_context(|| format!("'{}' failed quick verification", arg.dir.display()))?;
    println!("{} matches its Payload-Oxum", arg.dir.display());
    Ok(())
}

pub fn info(arg: BagArg) -> Result<()> {
    let bag = load(&arg.dir)?;
    println!("{}", summary(&bag));
    for (key, value) in bag.metadata.iter() {
        println!("  {key}: {value}");
    }
    for item in &bag.items_to_fetch {
        println!("  fetch {item}");
    }
    Ok(())
}

fn load(dir: &Path) -> Result<Bag> {
    read(dir).with_context(|| format!("Failed to read bag at '{}'", dir.display()))
}

fn summary(bag: &Bag) -> String {
    let payload: Vec<String> = bag
        .payload_manifests
        .values()
        .map(|manifest| format!("{} ({} files)", manifest.algorithm(), manifest.len()))
        .collect();
    let tags: Vec<&str> = bag.tag_manifests.keys().map(String::as_str).collect();

    format!(
        "{}\n  BagIt-Version: {}\n  Tag-File-Character-Encoding: {}\n  payload manifests: {}\n  tag manifests: {}",
        bag.root_dir.display(),
        bag.version,
        bag.file_encoding,
        if payload.is_empty() { "none".to_string() } else { payload.join(", ") },
        if tags.is_empty() { "none".to_string() } else { tags.join(", ") },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagit_core::{TagEncoding, Version};
    use std::fs;

    fn create_arg(dir: &Path) -> CreateArg {
        CreateArg {
            dir: dir.to_path_buf(),
            algorithms: vec!["md5".to_string()],
            bagit_version: Version::V1_0,
            encoding: TagEncoding::Utf8,
            include_hidden: false,
            metadata: vec![("Contact-Name".to_string(), "Ada".to_string())],
        }
    }

    #[test]
    fn create_then_check() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.txt"), b"hello\n").unwrap();

        create(create_arg(dir.path())).unwrap();
        let info = fs::read_to_string(dir.path().join("bag-info.txt")).unwrap();
        assert!(info.contains("Contact-Name: Ada\n"));

        let check = CheckArg { dir: dir.path().to_path_buf(), ignore_hidden: false };
        verify(check.clone()).unwrap();
        validate(check).unwrap();
        quick(BagArg { dir: dir.path().to_path_buf() }).unwrap();
    }

    #[test]
    fn failures_carry_context() {
        let dir = tempfile::tempdir().unwrap();
        let error = validate(CheckArg { dir: dir.path().to_path_buf(), ignore_hidden: false }).unwrap_err();
        assert!(format!("{error:#}").contains("Failed to read bag"));
    }

    #[test]
    fn summary_lists_manifests() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.txt"), b"hello\n").unwrap();
        create(create_arg(dir.path())).unwrap();

        let text = summary(&read(dir.path()).unwrap());
        assert!(text.contains("payload manifests: md5 (1 files)"));
        assert!(text.contains("tag manifests: md5"));
    }
}
