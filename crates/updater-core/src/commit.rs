use std::fmt;

/// One upstream commit integrated by a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    /// `Name <email>`
    pub author: String,
    pub message: String,
    /// 1-based index in capture order.
    pub position: usize,
}

impl CommitRecord {
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Commit #{} ({})", self.position, self.short_id())?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Commit message:")?;
        let message = self.message.trim_end();
        writeln!(f, "{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_block() {
        let commit = CommitRecord {
            id: "0123456789abcdef".into(),
            author: "Ada <ada@example.com>".into(),
            message: "Fix parser\n\nHandle empty input.\n\n".into(),
            position: 2,
        };
        assert_eq!(
            commit.to_string(),
            "Commit #2 (01234567)\nAuthor: Ada <ada@example.com>\nCommit message:\nFix parser\n\nHandle empty input.\n"
        );
    }

    #[test]
    fn short_id_of_short_hash() {
        let commit = CommitRecord {
            id: "abc".into(),
            author: String::new(),
            message: String::new(),
            position: 1,
        };
        assert_eq!(commit.short_id(), "abc");
    }
}
