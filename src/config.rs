use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::conf;
use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::registry::Registry;
use crate::value::Value;

/// Environment variable naming an extra fragment file to register.
pub const ENV_FILE_VAR: &str = "LINT_PRESETS_FILE";

/// Registry key used for `--config-data`.
pub const INLINE_NAME: &str = "<inline>";

/// Abstraction over environment/filesystem to enable full test coverage.
pub trait Env {
    /// Current working directory.
    fn current_dir(&self) -> PathBuf;
    /// Platform configuration directory (e.g., XDG config dir).
    fn config_dir(&self) -> Option<PathBuf>;
    /// Read file contents.
    ///
    /// # Errors
    /// Returns an error string when the file cannot be read.
    fn read_to_string(&self, p: &Path) -> std::result::Result<String, String>;
    fn path_exists(&self, p: &Path) -> bool;
    fn env_var(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnv;

impl Env for SystemEnv {
    fn current_dir(&self) -> PathBuf {
        PathBuf::from(".")
    }
    fn config_dir(&self) -> Option<PathBuf> {
        dirs_next::config_dir()
    }
    fn read_to_string(&self, p: &Path) -> std::result::Result<String, String> {
        fs::read_to_string(p).map_err(|e| e.to_string())
    }
    fn path_exists(&self, p: &Path) -> bool {
        p.exists()
    }
    fn env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub fragment_files: Vec<PathBuf>,
    pub fragment_data: Option<String>,
}

/// Serialization of a fragment document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Yaml,
    Json,
    Toml,
}

impl DocFormat {
    /// Pick a format from the file extension; anything unrecognised is
    /// read as YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Parse fragment text in the given format into a fragment named `name`.
///
/// # Errors
/// Returns [`Error::Parse`] on syntax errors and [`Error::InvalidFragment`]
/// when the document does not describe a fragment.
pub fn parse_fragment(name: &str, text: &str, format: DocFormat) -> Result<Fragment> {
    let parse_err = |reason: String| Error::Parse {
        origin: name.to_owned(),
        reason,
    };
    match format {
        DocFormat::Yaml => Fragment::from_yaml_str(name, text),
        DocFormat::Json => {
            let doc: Value = serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?;
            Fragment::from_value(name, &doc)
        }
        DocFormat::Toml => {
            let doc: Value = toml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
            Fragment::from_value(name, &doc)
        }
    }
}

/// Registry assembled from built-ins plus whatever the caller pointed at.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    pub registry: Registry,
    /// Fragment to resolve when the caller names none: the inline data if
    /// given, otherwise the last explicit file.
    pub root: Option<String>,
    /// Registry keys of every file loaded, in load order.
    pub sources: Vec<String>,
}

/// Build the registry with precedence: built-ins, user-global file,
/// `LINT_PRESETS_FILE`, explicit files, inline data.
///
/// # Errors
/// Returns an error when a fragment file cannot be read or parsed, or when
/// two sources claim the same name.
pub fn build_registry(overrides: &Overrides) -> Result<ConfigContext> {
    build_registry_with(overrides, &SystemEnv)
}

/// Build the registry using a provided `Env` implementation.
///
/// # Errors
/// Returns an error when a fragment file cannot be read or parsed, or when
/// two sources claim the same name.
pub fn build_registry_with(overrides: &Overrides, envx: &dyn Env) -> Result<ConfigContext> {
    let mut loader = Loader {
        registry: Registry::builtin(),
        envx,
        loading: Vec::new(),
        sources: Vec::new(),
    };
    let cwd = envx.current_dir();
    let mut root = None;

    if let Some(global) = envx
        .config_dir()
        .map(|base| base.join("lint-presets").join("presets.yaml"))
        .filter(|p| envx.path_exists(p))
    {
        loader.load_file(&global)?;
    }

    if let Some(var) = envx.env_var(ENV_FILE_VAR) {
        let path = PathBuf::from(&var);
        if envx.path_exists(&path) {
            loader.load_file(&path)?;
        } else {
            tracing::warn!(path = %var, "{ENV_FILE_VAR} points to a missing file, ignoring");
        }
    }

    for file in &overrides.fragment_files {
        root = Some(loader.load_file(file)?);
    }

    if let Some(raw) = &overrides.fragment_data {
        let bare = raw.trim();
        let shorthand = !bare.is_empty()
            && !bare.contains(char::is_whitespace)
            && (!bare.contains(':') || conf::is_external_reference(bare));
        let data = if shorthand {
            format!("extends: '{bare}'")
        } else {
            raw.clone()
        };
        let frag = Fragment::from_yaml_str(INLINE_NAME, &data)?;
        loader.register_with_extends(INLINE_NAME, frag, &cwd)?;
        root = Some(INLINE_NAME.to_owned());
    }

    Ok(ConfigContext {
        registry: loader.registry,
        root,
        sources: loader.sources,
    })
}

/// Load one fragment file (and every file it extends by path) into
/// `registry`, returning the key it was registered under.
///
/// # Errors
/// Returns an error when a file cannot be read or parsed, or when its key
/// collides with a name that is not the same file.
pub fn load_fragment_file(registry: &mut Registry, path: &Path, envx: &dyn Env) -> Result<String> {
    let mut loader = Loader {
        registry: std::mem::take(registry),
        envx,
        loading: Vec::new(),
        sources: Vec::new(),
    };
    let key = loader.load_file(path);
    *registry = loader.registry;
    key
}

struct Loader<'a> {
    registry: Registry,
    envx: &'a dyn Env,
    /// Keys whose files are being parsed further up the stack.
    loading: Vec<String>,
    sources: Vec<String>,
}

impl Loader<'_> {
    fn load_file(&mut self, path: &Path) -> Result<String> {
        let path = normalize(path);
        let key = path.display().to_string();
        if self.registry.contains(&key) || self.loading.contains(&key) {
            return Ok(key);
        }

        let text = self.envx.read_to_string(&path).map_err(|reason| Error::Read {
            path: path.clone(),
            reason,
        })?;
        let frag = parse_fragment(&key, &text, DocFormat::from_path(&path))?;
        let base_dir = path
            .parent()
            .map_or_else(|| self.envx.current_dir(), Path::to_path_buf);

        self.loading.push(key.clone());
        let registered = self.register_with_extends(&key, frag, &base_dir);
        self.loading.pop();
        registered?;

        tracing::info!(fragment = %key, "loaded fragment file");
        self.sources.push(key.clone());
        Ok(key)
    }

    fn register_with_extends(
        &mut self,
        name: &str,
        mut frag: Fragment,
        base_dir: &Path,
    ) -> Result<()> {
        for entry in frag.extends_mut() {
            if self.registry.contains(entry) || conf::builtin(entry).is_some() {
                continue;
            }
            if conf::is_external_reference(entry) {
                tracing::debug!(base = %entry, "declaring external base");
                self.registry.declare_external(entry)?;
                continue;
            }
            let resolved = resolve_extend_path(entry, self.envx, Some(base_dir));
            if !self.envx.path_exists(&resolved) {
                // left as-is; resolution reports it as unknown
                continue;
            }
            *entry = self.load_file(&resolved)?;
        }
        self.registry.register(name, frag)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let out: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if out.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        out
    }
}

fn resolve_extend_path(entry: &str, envx: &dyn Env, base_dir: Option<&Path>) -> PathBuf {
    let candidate = PathBuf::from(entry);
    if candidate.is_absolute() {
        return candidate;
    }
    if let Some(joined) = base_dir
        .map(|base| normalize(&base.join(&candidate)))
        .filter(|candidate| envx.path_exists(candidate))
    {
        return joined;
    }
    let cwd = envx.current_dir();
    let fallback = normalize(&cwd.join(&candidate));
    if envx.path_exists(&fallback) {
        fallback
    } else {
        candidate
    }
}
