/*!
Command modules.

Layout:
  src/cmd/
    mod.rs          (this file: declarations + re-exports)
    script.rs       (ScriptArgs + execute_script)
    attachment.rs   (script attachment subcommands)
    action.rs       (ActionArgs + execute_action)
    shared.rs       (Globals, client construction, parameter helpers)
    output.rs       (JSON / human rendering of responses)
    format.rs       (boxes, tables, colors)

Conventions:
  - Each top-level subcommand exposes one public `execute_*` function
    returning `anyhow::Result<()>`.
  - Request logic lives in an async `run` so tests can drive it against a
    mock server; `execute_*` only adds the runtime and printing.
*/

pub mod action;
pub mod attachment;
pub mod format;
pub mod output;
pub mod script;
pub mod shared;

pub use action::{ActionArgs, execute_action};
pub use output::{StatusFailure, output_error};
pub use script::{ScriptArgs, execute_script};
pub use shared::Globals;
