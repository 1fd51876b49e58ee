//! "Report a bug": a prefilled GitHub issue form.

use tracing::info;
use url::Url;

use crate::env::BuildEnvironment;
use crate::error::ActionError;
use crate::host::Shell;

/// Issue form for the configured repository.
#[derive(Debug, Clone)]
pub struct BugReport {
    repository: String,
    template: String,
    title: String,
    body: String,
}

impl BugReport {
    pub fn new(env: &BuildEnvironment) -> Self {
        let body = format!(
            "### Environment\n\n- Platform: `{}`\n- Version: `{}`\n- Build: `{}`\n\n### Description\n\n",
            env.platform.as_str(),
            env.app_version,
            env.build_type.as_str(),
        );
        Self {
            repository: env.web_link().to_string(),
            template: env.issue_template.clone(),
            title: format!("[Bug]: {} {}", env.app_name, env.app_version),
            body,
        }
    }

    /// The `issues/new` URL with template, title and body filled in.
    pub fn url(&self) -> Result<Url, ActionError> {
        let base = self.repository.trim_end_matches('/').trim_end_matches(".git");
        let url = Url::parse_with_params(
            &format!("{}/issues/new", base),
            &[
                ("template", self.template.as_str()),
                ("title", self.title.as_str()),
                ("body", self.body.as_str()),
            ],
        )?;
        Ok(url)
    }

    pub fn open(&self, shell: &dyn Shell) -> Result<(), ActionError> {
        let url = self.url()?;
        info!(url = %url, "Opening bug report form");
        shell
            .open_external(url.as_str())
            .map_err(|e| ActionError::BugReport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Platform;
    use crate::testing::{environment, RecordingShell};

    #[test]
    fn test_url_targets_new_issue() {
        let env = environment(Platform::Linux);
        let url = BugReport::new(&env).url().unwrap();

        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/webshell/webshell/issues/new");

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(params[0], ("template".into(), "bug_report.md".into()));
        assert_eq!(params[1].1, "[Bug]: WebShell 0.1.0");
        assert!(params[2].1.contains("Platform: `linux`"));
        assert!(params[2].1.contains("Build: `release`"));
    }

    #[test]
    fn test_git_suffix_is_dropped() {
        let mut env = environment(Platform::MacOs);
        env.repository = "git+https://github.com/webshell/webshell.git".into();
        let url = BugReport::new(&env).url().unwrap();
        assert_eq!(url.path(), "/webshell/webshell/issues/new");
    }

    #[test]
    fn test_invalid_repository_is_an_error() {
        let mut env = environment(Platform::Linux);
        env.repository = "not a url".into();
        assert!(matches!(
            BugReport::new(&env).url(),
            Err(ActionError::Url(_))
        ));
    }

    #[test]
    fn test_open_goes_through_shell() {
        let env = environment(Platform::Linux);
        let shell = RecordingShell::default();
        BugReport::new(&env).open(&shell).unwrap();

        let opened = shell.opened();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].starts_with("https://github.com/webshell/webshell/issues/new?"));
    }
}
