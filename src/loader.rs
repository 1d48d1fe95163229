//! Script module loading.
//!
//! A *module* is a single script file compiled and evaluated once, then kept
//! alive behind a [`ModuleProxy`].  The proxy exposes the file's top-level
//! contents uniformly:
//!
//! | Member kind        | Comes from                       |
//! |--------------------|----------------------------------|
//! | variable           | top-level `let` / `const`        |
//! | function           | top-level `fn` definition        |
//!
//! [`ModuleProxy::members`] lists top-level declarations first, in source
//! order, then functions sorted by name.  [`ModuleProxy::get`] fetches one
//! member; in *safe* mode an absent member yields the unit value instead of
//! an error, which lets callers test for optional hooks without a `match`
//! on every miss.
//!
//! Scripts run inside a host-configured engine: `print` and `debug` output
//! is captured into a per-module sink (drained by [`ModuleProxy::take_output`]),
//! and an `sh` function is registered so actions can shell out and inspect
//! `#{ok, code, stdout, stderr}` without any plumbing of their own.

use std::{
    cell::RefCell,
    fmt, fs, io, mem,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    rc::Rc,
};

use rhai::{AST, CallFnOptions, Dynamic, Engine, FnPtr, FuncArgs, Map, Scope};
use thiserror::Error;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LoadError {
    /// The script file does not exist.
    #[error("module not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The script could not be compiled or its top level failed to run.
    #[error("cannot load module '{name}': {detail}")]
    Module { name: String, detail: String },

    /// A call into an already-loaded module raised an error.
    #[error("error in module '{module}': {detail}")]
    Script { module: String, detail: String },

    /// Strict lookup of a member that the module does not define.
    #[error("module '{module}' has no member '{member}'")]
    NoMember { module: String, member: String },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ─── Host engine ──────────────────────────────────────────────────────────────

/// Run a command line under `sh -c`, capturing both streams.
fn run_shell(command: &str) -> io::Result<Output> {
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
}

/// The `sh` host function.  Failures to even spawn the shell are reported
/// the same way as command failures, with the error text on `stderr` and a
/// code of -1.
fn shell(command: &str) -> Map {
    let mut result = Map::new();
    match run_shell(command) {
        Ok(output) => {
            result.insert("ok".into(), output.status.success().into());
            result.insert(
                "code".into(),
                output.status.code().map_or(-1_i64, i64::from).into(),
            );
            result.insert(
                "stdout".into(),
                String::from_utf8_lossy(&output.stdout).into_owned().into(),
            );
            result.insert(
                "stderr".into(),
                String::from_utf8_lossy(&output.stderr).into_owned().into(),
            );
        }
        Err(e) => {
            result.insert("ok".into(), false.into());
            result.insert("code".into(), (-1_i64).into());
            result.insert("stdout".into(), String::new().into());
            result.insert("stderr".into(), e.to_string().into());
        }
    }
    result
}

/// An engine wired for action scripts: captured `print`/`debug` and the
/// `sh` helper.
fn script_engine(sink: &Rc<RefCell<String>>) -> Engine {
    let mut engine = Engine::new();

    let print_sink = Rc::clone(sink);
    engine.on_print(move |text| {
        let mut buffer = print_sink.borrow_mut();
        buffer.push_str(text);
        buffer.push('\n');
    });

    let debug_sink = Rc::clone(sink);
    engine.on_debug(move |text, _source, pos| {
        tracing::debug!(script = %text, line = ?pos, "script debug");
        let mut buffer = debug_sink.borrow_mut();
        buffer.push_str(text);
        buffer.push('\n');
    });

    engine.register_fn("sh", shell);
    engine
}

// ─── Module proxy ─────────────────────────────────────────────────────────────

/// A loaded script module: compiled AST plus the variable scope left behind
/// by its top-level run.
pub struct ModuleProxy {
    name: String,
    path: PathBuf,
    engine: Engine,
    ast: AST,
    scope: Scope<'static>,
    output: Rc<RefCell<String>>,
    safe: bool,
}

impl fmt::Debug for ModuleProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleProxy")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("safe", &self.safe)
            .finish_non_exhaustive()
    }
}

/// Load a module in safe mode (absent members read as unit).
pub fn load_module(path: impl AsRef<Path>, name: &str) -> Result<ModuleProxy, LoadError> {
    load_module_with(path, name, true)
}

/// Load a module with an explicit safe-mode setting.  Compiles the file,
/// runs its top level once, and keeps the resulting scope for member
/// access.
pub fn load_module_with(
    path: impl AsRef<Path>,
    name: &str,
    safe: bool,
) -> Result<ModuleProxy, LoadError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let output = Rc::new(RefCell::new(String::new()));
    let engine = script_engine(&output);

    let ast = engine.compile(&text).map_err(|e| LoadError::Module {
        name: name.to_string(),
        detail: e.to_string(),
    })?;

    let mut scope = Scope::new();
    engine
        .run_ast_with_scope(&mut scope, &ast)
        .map_err(|e| LoadError::Module {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

    tracing::debug!(module = name, path = %path.display(), "module loaded");

    Ok(ModuleProxy {
        name: name.to_string(),
        path: path.to_path_buf(),
        engine,
        ast,
        scope,
        output,
        safe,
    })
}

impl ModuleProxy {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn safe(&self) -> bool {
        self.safe
    }

    pub fn set_safe(&mut self, safe: bool) {
        self.safe = safe;
    }

    /// Every top-level member name: declarations with literal initializers
    /// in source order, then variables built at run time in scope order,
    /// then function names sorted.  Names are reported verbatim, shadowing
    /// and overloads included.
    pub fn members(&self) -> Vec<String> {
        // The run scope does not preserve declaration order for constants,
        // so the AST drives ordering; the scope contributes only the names
        // the AST cannot see (non-literal initializers).
        let mut names: Vec<String> = self
            .ast
            .iter_literal_variables(true, true)
            .map(|(name, _, _)| name.to_string())
            .collect();
        for (name, _, _) in self.scope.iter_raw() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        let mut fns: Vec<String> = self.ast.iter_functions().map(|f| f.name.to_string()).collect();
        fns.sort_unstable();
        names.extend(fns);
        names
    }

    /// Fetch one member.  Variables win over same-named functions;
    /// functions come back as callable pointers.  An absent member is unit
    /// in safe mode and [`LoadError::NoMember`] otherwise.
    pub fn get(&self, member: &str) -> Result<Dynamic, LoadError> {
        if let Some(value) = self.scope.get(member) {
            return Ok(value.clone());
        }
        if self.ast.iter_functions().any(|f| f.name == member) {
            let ptr = FnPtr::new(member).map_err(|e| LoadError::Script {
                module: self.name.clone(),
                detail: e.to_string(),
            })?;
            return Ok(Dynamic::from(ptr));
        }
        if self.safe {
            return Ok(Dynamic::UNIT);
        }
        Err(LoadError::NoMember {
            module: self.name.clone(),
            member: member.to_string(),
        })
    }

    /// Whether the module defines `name` taking exactly `arity` parameters.
    pub fn has_fn(&self, name: &str, arity: usize) -> bool {
        self.ast
            .iter_functions()
            .any(|f| f.name == name && f.params.len() == arity)
    }

    /// Call a module function and hand back its raw result.  The top level
    /// does not run again; the scope carries whatever state it left behind.
    pub fn call(&mut self, name: &str, args: impl FuncArgs) -> Result<Dynamic, LoadError> {
        let options = CallFnOptions::new().eval_ast(false);
        self.engine
            .call_fn_with_options(options, &mut self.scope, &self.ast, name, args)
            .map_err(|e| LoadError::Script {
                module: self.name.clone(),
                detail: e.to_string(),
            })
    }

    /// Drain captured `print`/`debug` output.
    pub fn take_output(&mut self) -> String {
        mem::take(&mut *self.output.borrow_mut())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
