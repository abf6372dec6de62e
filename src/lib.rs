// Library root
// -----------
// The binary (`main.rs`) parses flags, sets up logging and hands a
// `Watcher` to the loop; everything it needs lives here so the pieces can
// be tested on their own.
//
// Module responsibilities:
// - `scanner`: walks the watched tree and yields files newer than the
//   watermark.
// - `watermark`: the committed "already handled" cutoff.
// - `api`: the blocking webhook client that uploads one file per request.
// - `watch`: the scan/upload/commit/sleep loop tying the two together.
// - `cli`, `config`: command-line flags and the validated settings built
//   from them.
// - `retry`: backoff for transient network failures.
// - `update`: optional startup check against a release feed.
// - `ui`: the spinner shown while an upload is running.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod retry;
pub mod scanner;
pub mod ui;
pub mod update;
pub mod watch;
pub mod watermark;
