//! Loading REQ, INT and UNIT documents from the corpus directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use syskit_common_config::ProjectLayout;
use syskit_common_fs::{self as fs, FsError};
use tracing::debug;

use crate::id::{DocId, DocKind};
use crate::parsing::{Markdown, ParseError};

/// Directories holding each document kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocDirs {
    pub requirements: PathBuf,
    pub interfaces: PathBuf,
    pub design: PathBuf,
}

impl DocDirs {
    pub fn from_layout(layout: &ProjectLayout) -> Self {
        Self {
            requirements: layout.requirements_dir.clone(),
            interfaces: layout.interfaces_dir.clone(),
            design: layout.design_dir.clone(),
        }
    }

    /// Directory for `kind`.
    pub fn dir(&self, kind: DocKind) -> &Path {
        match kind {
            DocKind::Req => &self.requirements,
            DocKind::Int => &self.interfaces,
            DocKind::Unit => &self.design,
        }
    }
}

/// Whether `<prefix>_000_template.md` files take part in a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Templates {
    Include,
    Exclude,
}

/// A corpus document: its id, location and parsed text.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocId,
    path: PathBuf,
    markdown: Markdown,
    modified: bool,
}

impl Document {
    /// Read and parse the document at `path`.
    ///
    /// Returns `Ok(None)` when the file name carries no document id.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, CorpusError> {
        let path = path.as_ref();
        let Some(id) = fs::stem(path).and_then(|stem| DocId::from_file_name(&stem)) else {
            return Ok(None);
        };

        let source = fs::read_document(path)?;
        let markdown = Markdown::parse(source).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(Self {
            id,
            path: path.to_path_buf(),
            markdown,
            modified: false,
        }))
    }

    pub fn id(&self) -> &DocId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn markdown(&self) -> &Markdown {
        &self.markdown
    }

    /// Title from the `# ID: Title` heading.
    pub fn title(&self) -> Option<&str> {
        self.markdown.title()
    }

    pub fn source(&self) -> &str {
        self.markdown.source()
    }

    pub fn is_template(&self) -> bool {
        self.id.is_template()
    }

    /// Resolve the first pending section named `name`. See [`Markdown::resolve`].
    pub fn resolve(&mut self, name: &str, replacement: &str) -> Result<bool, CorpusError> {
        let changed = self
            .markdown
            .resolve(name, replacement)
            .map_err(|source| CorpusError::Parse {
                path: self.path.clone(),
                source,
            })?;
        self.modified |= changed;
        Ok(changed)
    }

    /// Whether [`Document::resolve`] changed the text since loading.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Write the document back to its path.
    pub fn save(&mut self) -> Result<(), CorpusError> {
        fs::write_string_atomic(&self.path, self.markdown.source())?;
        self.modified = false;
        Ok(())
    }
}

/// All documents found under a [`DocDirs`], grouped by kind in lexical file order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    requirements: Vec<Document>,
    interfaces: Vec<Document>,
    units: Vec<Document>,
}

impl Corpus {
    /// Scan and parse every `<prefix>_*.md` file.
    pub fn load(dirs: &DocDirs, templates: Templates) -> Result<Self, CorpusError> {
        let mut corpus = Self::default();
        for kind in DocKind::ALL {
            let docs = Self::scan(dirs.dir(kind), kind, templates)?;
            debug!(kind = %kind, count = docs.len(), "Scanned documents");
            *corpus.kind_mut(kind) = docs;
        }
        Ok(corpus)
    }

    fn scan(dir: &Path, kind: DocKind, templates: Templates) -> Result<Vec<Document>, CorpusError> {
        let mut docs = Vec::new();
        for path in fs::list_markdown(dir, kind.file_prefix())? {
            match Document::load(&path)? {
                Some(doc) if templates == Templates::Exclude && doc.is_template() => {
                    debug!(path = %path.display(), "Skipping template");
                }
                Some(doc) if doc.id.kind() == kind => docs.push(doc),
                _ => debug!(path = %path.display(), "No document id in file name"),
            }
        }
        Ok(docs)
    }

    fn kind_mut(&mut self, kind: DocKind) -> &mut Vec<Document> {
        match kind {
            DocKind::Req => &mut self.requirements,
            DocKind::Int => &mut self.interfaces,
            DocKind::Unit => &mut self.units,
        }
    }

    /// Documents of one kind, in file order.
    pub fn documents(&self, kind: DocKind) -> &[Document] {
        match kind {
            DocKind::Req => &self.requirements,
            DocKind::Int => &self.interfaces,
            DocKind::Unit => &self.units,
        }
    }

    pub fn documents_mut(&mut self, kind: DocKind) -> &mut [Document] {
        self.kind_mut(kind)
    }

    /// Every document, REQ then INT then UNIT.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        DocKind::ALL
            .into_iter()
            .flat_map(move |kind| self.documents(kind).iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.requirements
            .iter_mut()
            .chain(self.interfaces.iter_mut())
            .chain(self.units.iter_mut())
    }

    /// Ids of every loaded document.
    pub fn ids(&self) -> BTreeSet<DocId> {
        self.iter().map(|doc| doc.id.clone()).collect()
    }

    pub fn get(&self, id: &DocId) -> Option<&Document> {
        self.documents(id.kind()).iter().find(|doc| &doc.id == id)
    }

    pub fn count(&self, kind: DocKind) -> usize {
        self.documents(kind).len()
    }

    pub fn len(&self) -> usize {
        self.requirements.len() + self.interfaces.len() + self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every modified document. Returns how many were written.
    pub fn save_modified(&mut self) -> Result<usize, CorpusError> {
        let mut written = 0;
        for doc in self.iter_mut().filter(|doc| doc.is_modified()) {
            doc.save()?;
            debug!(id = %doc.id, path = %doc.path.display(), "Wrote document");
            written += 1;
        }
        Ok(written)
    }
}

/// Corpus loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
