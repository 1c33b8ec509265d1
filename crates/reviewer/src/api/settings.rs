use serde::{Deserialize, Serialize};

const MASK: &str = "********";

/// Документ настроек сканера (`GET /api/info`). Только чтение.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db_credentials: DbCredentials,
    #[serde(default)]
    pub github: GithubSettings,
    #[serde(default)]
    pub globals: Globals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCredentials {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubSettings {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub langs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Globals {
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Settings {
    /// Копия для вывода: пароль скрыт, у токенов видны только последние 4 символа.
    pub fn masked(&self) -> Settings {
        let mut out = self.clone();
        if !out.db_credentials.password.is_empty() {
            out.db_credentials.password = MASK.to_string();
        }
        out.github.tokens = out.github.tokens.iter().map(|t| mask_token(t)).collect();
        out
    }
}

fn mask_token(token: &str) -> String {
    let n = token.chars().count();
    if n <= 4 {
        return MASK.to_string();
    }
    let tail: String = token.chars().skip(n - 4).collect();
    format!("{MASK}{tail}")
}
