//! Test fixtures and data for harness tests
//!
//! Consistent report bodies, log contents and configuration values used
//! across all test suites.

use harness::HarnessConfig;
use std::path::PathBuf;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const TARGET_PID: u32 = 4242;
    pub const GAUSSIAN: &'static str = "fit_testing_gaussian";

    /// Rendered report without any stderr output
    pub const CLEAN_REPORT: &'static str = r#"<html><body>
<div class="output_subarea output_stream output_stdout output_text">
<pre>Fit converged</pre>
</div>
</body></html>"#;

    /// Rendered report with captured stderr
    pub const STDERR_REPORT: &'static str = r#"<html><body>
<div class="output_subarea output_stream output_stderr output_text">
<pre>RuntimeWarning: overflow encountered in exp</pre>
</div>
</body></html>"#;

    pub const CLEAN_APP_LOG: &'static str = "2018-03-01 10:00:00 info Starting Manager\n\
                                             2018-03-01 10:00:04 warning Config missing, using defaults\n\
                                             2018-03-01 10:01:00 info Manager shut down\n";

    pub const ERROR_APP_LOG: &'static str = "2018-03-01 10:00:00 info Starting Manager\n\
                                             2018-03-01 10:00:10 error Could not load module fitlogic\n\
                                             2018-03-01 10:00:11 error Traceback follows\n\
                                             2018-03-01 10:01:00 info Manager shut down\n";

    pub const CRASH_LOG: &'static str = "Fatal Python error: Segmentation fault\n";

    /// Default configuration with the grace periods zeroed
    pub fn config() -> HarnessConfig {
        HarnessConfig::builder().no_grace().build()
    }

    /// Report path the mock executor hands out for a notebook name
    pub fn report_path(name: &str) -> PathBuf {
        Self::config().report_dir_path().join(format!("{name}.html"))
    }

    pub fn battery() -> Vec<String> {
        Self::config().battery
    }
}
