//! Tests for the provider adapters.

use mockito::{Matcher, Server};
use tracing::Span;

use super::*;
use crate::config::ApiScheme;
use crate::error::{RemoteError, RemoteStage};

fn github() -> GitHubAdapter {
    GitHubAdapter::new(reqwest::Client::new(), ApiScheme::Http, Span::none())
}

fn gitlab() -> GitLabAdapter {
    GitLabAdapter::new(reqwest::Client::new(), ApiScheme::Http, Span::none())
}

fn location(server: &Server) -> RepoLocation {
    RepoLocation::new(server.host_with_port(), "o", "r")
}

fn entry(kind: &str, path: &str) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        kind: kind.to_string(),
    }
}

fn remote(error: ResolveError) -> RemoteError {
    match error {
        ResolveError::Remote(remote) => remote,
        other => panic!("expected remote error, got {other:?}"),
    }
}

mod filter_tests {
    use super::*;

    #[test]
    fn keeps_markdown_blobs_in_tree_order() {
        let files = markdown_blobs(vec![
            entry("blob", "a.md"),
            entry("tree", "b.md"),
            entry("blob", "c.MD"),
            entry("blob", "d.txt"),
        ]);
        assert_eq!(files, vec!["a.md", "c.MD"]);
    }

    #[test]
    fn accepts_markdown_long_extension() {
        assert!(is_markdown_path("docs/guide.markdown"));
        assert!(is_markdown_path("NOTES.Markdown"));
        assert!(!is_markdown_path("readme.mdx"));
        assert!(!is_markdown_path("md"));
    }

    #[test]
    fn empty_tree_yields_no_files() {
        assert!(markdown_blobs(Vec::new()).is_empty());
    }
}

mod github_tests {
    use super::*;

    #[test]
    fn public_host_maps_to_api_host() {
        assert_eq!(GitHubAdapter::api_host("github.com"), "api.github.com");
        assert_eq!(GitHubAdapter::api_host("ghe.corp.local"), "ghe.corp.local");
    }

    #[tokio::test]
    async fn list_resolves_default_branch_when_missing() {
        let mut server = Server::new_async().await;
        let metadata = server
            .mock("GET", "/repos/o/r")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"default_branch": "main"}"#)
            .expect(1)
            .create_async()
            .await;
        let tree = server
            .mock("GET", "/repos/o/r/git/trees/main")
            .match_query(Matcher::UrlEncoded("recursive".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sha": "abc", "tree": [{"path": "README.md", "type": "blob"}], "truncated": false}"#)
            .expect(1)
            .create_async()
            .await;

        let result = github().list_markdown_files(&location(&server)).await.unwrap();

        metadata.assert_async().await;
        tree.assert_async().await;
        assert_eq!(result.resolved_branch, "main");
        assert_eq!(result.files, vec!["README.md"]);
    }

    #[tokio::test]
    async fn list_with_branch_skips_metadata_and_filters() {
        let mut server = Server::new_async().await;
        let metadata = server
            .mock("GET", "/repos/o/r")
            .expect(0)
            .create_async()
            .await;
        let tree = server
            .mock("GET", "/repos/o/r/git/trees/develop")
            .match_query(Matcher::UrlEncoded("recursive".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"{"tree": [
                    {"path": "a.md", "type": "blob"},
                    {"path": "b.md", "type": "tree"},
                    {"path": "c.MD", "type": "blob"},
                    {"path": "d.txt", "type": "blob"}
                ]}"#,
            )
            .create_async()
            .await;

        let result = github()
            .list_markdown_files(&location(&server).with_branch(Some("develop".into())))
            .await
            .unwrap();

        metadata.assert_async().await;
        tree.assert_async().await;
        assert_eq!(result.resolved_branch, "develop");
        assert_eq!(result.files, vec!["a.md", "c.MD"]);
    }

    #[tokio::test]
    async fn list_tree_failure_is_remote_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/o/r/git/trees/gone")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let error = github()
            .list_markdown_files(&location(&server).with_branch(Some("gone".into())))
            .await
            .unwrap_err();

        let error = remote(error);
        assert_eq!(error.stage, RemoteStage::Tree);
        assert_eq!(error.status, 404);
        assert_eq!(error.message, "GitHub tree error (404)");
    }

    #[tokio::test]
    async fn default_branch_failure_reports_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/o/r")
            .with_status(403)
            .create_async()
            .await;

        let error = github()
            .list_markdown_files(&location(&server))
            .await
            .unwrap_err();

        let error = remote(error);
        assert!(error.is_host_resolution());
        assert_eq!(error.status, 403);
        assert_eq!(error.message, "GitHub repo not found or no access (403)");
    }

    #[tokio::test]
    async fn get_file_requests_raw_content_with_bearer_token() {
        let mut server = Server::new_async().await;
        let contents = server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .match_header("accept", "application/vnd.github.raw+json")
            .match_header("authorization", "Bearer ghp_test")
            .with_status(200)
            .with_body("# Title\n\nBody\n")
            .expect(1)
            .create_async()
            .await;

        let location = location(&server)
            .with_branch(Some("main".into()))
            .with_token(Some("ghp_test".into()));
        let result = github().get_file_content(&location, "README.md").await.unwrap();

        contents.assert_async().await;
        assert_eq!(result.content, "# Title\n\nBody\n");
    }

    #[tokio::test]
    async fn get_file_without_token_sends_no_authorization() {
        let mut server = Server::new_async().await;
        let contents = server
            .mock("GET", "/repos/o/r/contents/docs%2Fguide.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("guide")
            .create_async()
            .await;

        let result = github()
            .get_file_content(&location(&server).with_branch(Some("main".into())), "docs/guide.md")
            .await
            .unwrap();

        contents.assert_async().await;
        assert_eq!(result.content, "guide");
    }

    #[tokio::test]
    async fn get_file_falls_back_to_default_branch_once() {
        let mut server = Server::new_async().await;
        let wrong_branch = server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "mian".into()))
            .with_status(404)
            .with_body(r#"{"message": "No commit found for the ref mian"}"#)
            .expect(1)
            .create_async()
            .await;
        let metadata = server
            .mock("GET", "/repos/o/r")
            .with_status(200)
            .with_body(r#"{"default_branch": "main"}"#)
            .expect(1)
            .create_async()
            .await;
        let default_branch = server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(200)
            .with_body("from main")
            .expect(1)
            .create_async()
            .await;

        let result = github()
            .get_file_content(&location(&server).with_branch(Some("mian".into())), "README.md")
            .await
            .unwrap();

        wrong_branch.assert_async().await;
        metadata.assert_async().await;
        default_branch.assert_async().await;
        assert_eq!(result.content, "from main");
    }

    #[tokio::test]
    async fn get_file_wrong_path_fails_without_retry() {
        let mut server = Server::new_async().await;
        let contents = server
            .mock("GET", "/repos/o/r/contents/missing.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .expect(1)
            .create_async()
            .await;
        let metadata = server
            .mock("GET", "/repos/o/r")
            .expect(0)
            .create_async()
            .await;

        let error = github()
            .get_file_content(&location(&server).with_branch(Some("main".into())), "missing.md")
            .await
            .unwrap_err();

        contents.assert_async().await;
        metadata.assert_async().await;
        let error = remote(error);
        assert_eq!(error.status, 404);
        assert!(!error.retried);
        assert!(error.message.contains("o/r@main:missing.md"));
        assert!(error.message.ends_with(r#"- {"message": "Not Found"}"#));
    }

    #[tokio::test]
    async fn get_file_no_retry_when_default_matches_requested() {
        let mut server = Server::new_async().await;
        let contents = server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(404)
            .with_body("No commit found for the ref main")
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/o/r")
            .with_status(200)
            .with_body(r#"{"default_branch": "main"}"#)
            .expect(1)
            .create_async()
            .await;

        let error = github()
            .get_file_content(&location(&server).with_branch(Some("main".into())), "README.md")
            .await
            .unwrap_err();

        contents.assert_async().await;
        let error = remote(error);
        assert!(!error.retried);
        assert!(error.message.contains("@main:README.md"));
    }

    #[tokio::test]
    async fn get_file_retry_failure_is_marked_retried() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "feature".into()))
            .with_status(404)
            .with_body("No commit found for the ref feature")
            .create_async()
            .await;
        server
            .mock("GET", "/repos/o/r")
            .with_status(200)
            .with_body(r#"{"default_branch": "trunk"}"#)
            .create_async()
            .await;
        let retry = server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "trunk".into()))
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .expect(1)
            .create_async()
            .await;

        let error = github()
            .get_file_content(&location(&server).with_branch(Some("feature".into())), "README.md")
            .await
            .unwrap_err();

        retry.assert_async().await;
        let error = remote(error);
        assert!(error.retried);
        assert_eq!(error.stage, RemoteStage::Contents);
        assert!(error.message.contains("@trunk:README.md"));
    }

    #[tokio::test]
    async fn get_file_without_branch_never_falls_back() {
        let mut server = Server::new_async().await;
        let metadata = server
            .mock("GET", "/repos/o/r")
            .with_status(200)
            .with_body(r#"{"default_branch": "main"}"#)
            .expect(1)
            .create_async()
            .await;
        let contents = server
            .mock("GET", "/repos/o/r/contents/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(404)
            .with_body("No commit found for the ref main")
            .expect(1)
            .create_async()
            .await;

        let error = github()
            .get_file_content(&location(&server), "README.md")
            .await
            .unwrap_err();

        metadata.assert_async().await;
        contents.assert_async().await;
        assert!(!remote(error).retried);
    }
}

mod gitlab_tests {
    use super::*;

    const TREE_PATH: &str = "/api/v4/projects/o%2Fr/repository/tree";

    fn tree_query(reference: &str, page: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("ref".into(), reference.into()),
            Matcher::UrlEncoded("recursive".into(), "true".into()),
            Matcher::UrlEncoded("page".into(), page.into()),
        ])
    }

    #[tokio::test]
    async fn get_file_defaults_to_main_without_lookup() {
        let mut server = Server::new_async().await;
        let raw = server
            .mock("GET", "/api/v4/projects/o%2Fr/repository/files/docs%2Fx.md/raw")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(200)
            .with_body("line one\nline two\n\n")
            .expect(1)
            .create_async()
            .await;

        let result = gitlab()
            .get_file_content(&location(&server), "docs/x.md")
            .await
            .unwrap();

        raw.assert_async().await;
        assert_eq!(result.content, "line one\nline two\n\n");
    }

    #[tokio::test]
    async fn get_file_sends_private_token() {
        let mut server = Server::new_async().await;
        let raw = server
            .mock("GET", "/api/v4/projects/o%2Fr/repository/files/README.md/raw")
            .match_query(Matcher::UrlEncoded("ref".into(), "dev".into()))
            .match_header("private-token", "glpat-test")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("private")
            .create_async()
            .await;

        let location = location(&server)
            .with_branch(Some("dev".into()))
            .with_token(Some("glpat-test".into()));
        let result = gitlab().get_file_content(&location, "README.md").await.unwrap();

        raw.assert_async().await;
        assert_eq!(result.content, "private");
    }

    #[tokio::test]
    async fn get_file_wrong_branch_fails_without_retry() {
        let mut server = Server::new_async().await;
        let raw = server
            .mock("GET", "/api/v4/projects/o%2Fr/repository/files/README.md/raw")
            .match_query(Matcher::UrlEncoded("ref".into(), "master".into()))
            .with_status(404)
            .with_body(r#"{"message":"404 Commit Not Found"}"#)
            .expect(1)
            .create_async()
            .await;

        let error = gitlab()
            .get_file_content(&location(&server).with_branch(Some("master".into())), "README.md")
            .await
            .unwrap_err();

        raw.assert_async().await;
        let error = remote(error);
        assert_eq!(error.provider, Provider::Gitlab);
        assert_eq!(error.status, 404);
        assert!(!error.retried);
        assert!(error.message.starts_with("GitLab file error (404)"));
    }

    #[tokio::test]
    async fn list_follows_pages_and_filters() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", TREE_PATH)
            .match_query(tree_query("main", "1"))
            .with_status(200)
            .with_header("x-next-page", "2")
            .with_body(
                r#"[
                    {"id": "1", "name": "docs", "type": "tree", "path": "docs", "mode": "040000"},
                    {"id": "2", "name": "README.md", "type": "blob", "path": "README.md", "mode": "100644"}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", TREE_PATH)
            .match_query(tree_query("main", "2"))
            .with_status(200)
            .with_header("x-next-page", "")
            .with_body(
                r#"[
                    {"id": "3", "name": "guide.markdown", "type": "blob", "path": "docs/guide.markdown", "mode": "100644"},
                    {"id": "4", "name": "logo.png", "type": "blob", "path": "docs/logo.png", "mode": "100644"}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let result = gitlab().list_markdown_files(&location(&server)).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(result.resolved_branch, "main");
        assert_eq!(result.files, vec!["README.md", "docs/guide.markdown"]);
    }

    #[tokio::test]
    async fn list_tree_failure_is_remote_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", TREE_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"401 Unauthorized"}"#)
            .create_async()
            .await;

        let error = gitlab()
            .list_markdown_files(&location(&server))
            .await
            .unwrap_err();

        let error = remote(error);
        assert_eq!(error.stage, RemoteStage::Tree);
        assert_eq!(error.status, 401);
        assert!(error.message.starts_with("GitLab tree error (401)"));
    }
}
