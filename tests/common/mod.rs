#![allow(dead_code)]

use lopdf::{Document, Object, dictionary};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use pdf_tidy::{DocumentInfo, MetadataError, MetadataReader};

/// Write a one-page PDF, with a `/Title` in its info dictionary when given.
pub fn write_pdf(path: &Path, title: Option<&str>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("pdf_tidy tests"),
        });
        doc.trailer.set("Info", info_id);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

/// Canonical temp root, so paths compare equal to what the engines report.
pub fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
    let td = tempfile::tempdir().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    (td, root)
}

/// Sorted file names in `dir`, audit logs excluded.
pub fn pdf_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.starts_with("pdf_rename_log_"))
        .collect();
    names.sort();
    names
}

pub fn audit_logs(dir: &Path) -> Vec<PathBuf> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with("pdf_rename_log_"))
        .collect();
    logs.sort();
    logs
}

/// In-memory reader: title per file name; unknown names carry no metadata.
pub struct FakeReader {
    titles: HashMap<String, String>,
}

impl FakeReader {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            titles: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    /// Every file reports the same title.
    pub fn uniform(names: &[String], title: &str) -> Self {
        Self {
            titles: names.iter().map(|n| (n.clone(), title.to_string())).collect(),
        }
    }
}

impl MetadataReader for FakeReader {
    fn read_info(&self, path: &Path) -> Result<Option<DocumentInfo>, MetadataError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        Ok(self.titles.get(&name).map(DocumentInfo::with_title))
    }
}
