// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Map a `-v` count to the default `cnquery` log filter
///
/// # Arguments
/// * `verbose` - Verbosity level (0=warn, 1=info, 2=debug, 3+=trace)
pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "cnquery=warn",
        1 => "cnquery=info",
        2 => "cnquery=debug",
        _ => "cnquery=trace",
    }
}

/// Initialize the logger with the specified verbosity level.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn setup_logger(verbose: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter_for(verbose)))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_levels() {
        assert_eq!(filter_for(0), "cnquery=warn");
        assert_eq!(filter_for(1), "cnquery=info");
        assert_eq!(filter_for(2), "cnquery=debug");
        assert_eq!(filter_for(3), "cnquery=trace");
        assert_eq!(filter_for(9), "cnquery=trace");
    }
}
