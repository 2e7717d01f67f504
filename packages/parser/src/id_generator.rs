use crc32fast::Hasher;

/// Generate a document ID from its file path using CRC32.
///
/// Unsaved documents get the shared `untitled` identity until they are
/// given a path.
pub fn document_id(path: Option<&str>) -> String {
    let buff = match path {
        Some(p) if p.starts_with("file://") => p.to_string(),
        Some(p) => format!("file://{}", p),
        None => "untitled".to_string(),
    };

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// CRC32 content hash, used to key the fragment cache and to match node
/// identities across re-parses.
pub fn content_hash(text: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(text.as_bytes());
    hasher.finalize()
}

/// Sequential ID generator for nodes within a document.
///
/// The counter never resets for the lifetime of a document, so ids minted
/// by later incremental re-parses can never collide with surviving ones.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Document ID (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(path: Option<&str>) -> Self {
        Self {
            seed: document_id(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate the next sequential ID.
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get the document ID seed.
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_stable() {
        let id1 = document_id(Some("/notes/todo.md"));
        let id2 = document_id(Some("/notes/todo.md"));
        assert_eq!(id1, id2);

        let id3 = document_id(Some("/notes/journal.md"));
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_untitled_documents_share_a_seed() {
        assert_eq!(document_id(None), document_id(None));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new(Some("/notes/todo.md"));

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(gen.seed()));
    }

    #[test]
    fn test_content_hash_tracks_content() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
    }
}
