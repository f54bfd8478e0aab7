use std::io::Write;

/// The process environment the commands talk to, replaceable in tests
pub trait Host: Send + Sync {
    // where results and summaries go (e.g., stdout)
    fn output(&mut self) -> impl Write;

    // where failures are reported (e.g., stderr)
    fn error(&mut self) -> impl Write;

    /// Terminate the process (although in a test environment this might just record the code).
    fn exit(&mut self, code: i32);
}

/// Host that keeps everything written to it and the last exit code
#[cfg(any(debug_assertions, test))]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[cfg(any(debug_assertions, test))]
impl TestHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    #[must_use]
    pub fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(any(debug_assertions, test))]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
