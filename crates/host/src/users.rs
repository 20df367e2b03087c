// Path: crates/host/src/users.rs
//! Local user enumeration.

use std::path::Path;

use crate::HostError;

/// Read account names from a passwd-format file (first `:`-separated field
/// per line).
pub async fn read_passwd_names(path: &Path) -> Result<Vec<String>, HostError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| HostError::Io(e.to_string()))?;
    Ok(parse_passwd(&contents))
}

fn parse_passwd(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(':').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_field() {
        let contents = "root:x:0:0:root:/root:/bin/bash\n\
                        daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n";
        assert_eq!(
            parse_passwd(contents),
            vec!["root".to_string(), "daemon".to_string()]
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let contents = "# locals\n\nroot:x:0:0::/root:/bin/sh\n";
        assert_eq!(parse_passwd(contents), vec!["root".to_string()]);
    }

    #[tokio::test]
    async fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        tokio::fs::write(&path, "alice:x:1000:1000::/home/alice:/bin/bash\n")
            .await
            .unwrap();
        assert_eq!(
            read_passwd_names(&path).await.unwrap(),
            vec!["alice".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_passwd_names(&dir.path().join("nope")).await.is_err());
    }
}
