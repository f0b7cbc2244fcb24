//! The boundary to the text normalizer under test.
//!
//! The harness treats normalization as an opaque capability: it hands over
//! an input and its category and gets text back, or an error.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::NormalizerError;

/// Environment variable carrying the language code to a [`CommandNormalizer`].
pub const LANG_ENV: &str = "NORMCHECK_LANG";

/// Environment variable carrying the case category to a [`CommandNormalizer`].
pub const CATEGORY_ENV: &str = "NORMCHECK_CATEGORY";

/// Default bound on a single normalizer invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A text normalizer.
pub trait Normalizer: Send + Sync {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Normalize `input`, which belongs to `category`.
    fn normalize(&self, input: &str, category: &str) -> Result<String, NormalizerError>;
}

impl<N: Normalizer + ?Sized> Normalizer for Box<N> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn normalize(&self, input: &str, category: &str) -> Result<String, NormalizerError> {
        (**self).normalize(input, category)
    }
}

/// Adapts a closure into a [`Normalizer`].
///
/// ```
/// use normcheck_core::{FnNormalizer, Normalizer};
///
/// let upper = FnNormalizer::new("upper", |input: &str, _category: &str| Ok(input.to_uppercase()));
/// assert_eq!(upper.normalize("abc", "word").unwrap(), "ABC");
/// ```
pub struct FnNormalizer<F> {
    name: String,
    f: F,
}

impl<F> FnNormalizer<F>
where
    F: Fn(&str, &str) -> Result<String, NormalizerError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Normalizer for FnNormalizer<F>
where
    F: Fn(&str, &str) -> Result<String, NormalizerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn normalize(&self, input: &str, category: &str) -> Result<String, NormalizerError> {
        (self.f)(input, category)
    }
}

/// Runs an external program once per case.
///
/// The input is written to the program's stdin and its stdout, minus one
/// trailing line ending, is the normalized text. The language and category
/// are passed in [`LANG_ENV`] and [`CATEGORY_ENV`]. A non-zero exit status,
/// non-UTF-8 output or exceeding the timeout is a [`NormalizerError`]; on
/// timeout the child is killed.
#[derive(Debug, Clone)]
pub struct CommandNormalizer {
    program: String,
    args: Vec<String>,
    lang: String,
    timeout: Duration,
}

impl CommandNormalizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            lang: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Normalizer for CommandNormalizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn normalize(&self, input: &str, category: &str) -> Result<String, NormalizerError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(LANG_ENV, &self.lang)
            .env(CATEGORY_ENV, category)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| NormalizerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Pipes are serviced on their own threads while the timeout runs.
        let input = input.as_bytes().to_vec();
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || match stdin.write_all(&input) {
                // Programs that never read stdin close the pipe early.
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            })
        });
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                // Helper threads are detached; a grandchild may still hold the pipes.
                return Err(NormalizerError::Timeout(self.timeout));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        join(writer)?;
        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        if !status.success() {
            return Err(NormalizerError::Exit {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
            });
        }

        let output = String::from_utf8(stdout).map_err(|_| NormalizerError::InvalidOutput)?;
        Ok(strip_line_ending(output))
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join<T: Default>(handle: Option<JoinHandle<io::Result<T>>>) -> Result<T, NormalizerError> {
    let Some(handle) = handle else {
        return Ok(T::default());
    };
    let result = handle
        .join()
        .map_err(|_| NormalizerError::Failed("normalizer pipe thread panicked".to_string()))?;
    Ok(result?)
}

fn strip_line_ending(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}
