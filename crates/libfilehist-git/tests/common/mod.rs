//! Scratch repositories for backend tests
//!
//! Commits are written through git2 with fixed signatures and timestamps so
//! both backends see identical, reproducible history.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Repository, Signature, Time};
use tempfile::{tempdir, TempDir};

pub const BASE_TIME: i64 = 1_700_000_000;

pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
    tick: i64,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo, tick: 0 }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path string for a repo-relative file
    pub fn file_arg(&self, rel: &str) -> String {
        self.root().join(rel).display().to_string()
    }

    /// Write `rel` and commit it; returns the full commit hash
    pub fn commit_file(&mut self, rel: &str, contents: &str, message: &str) -> String {
        let full: PathBuf = self.root().join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, contents).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(rel)).unwrap();
        index.write().unwrap();
        self.commit_index(message)
    }

    /// Delete `rel` and commit the removal
    pub fn remove_file(&mut self, rel: &str, message: &str) -> String {
        fs::remove_file(self.root().join(rel)).unwrap();

        let mut index = self.repo.index().unwrap();
        index.remove_path(Path::new(rel)).unwrap();
        index.write().unwrap();
        self.commit_index(message)
    }

    fn commit_index(&mut self, message: &str) -> String {
        self.tick += 60;
        let sig = Signature::new(
            "Test Author",
            "test@example.com",
            &Time::new(BASE_TIME + self.tick, 0),
        )
        .unwrap();

        let mut index = self.repo.index().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit")
            .to_string()
    }
}
