pub mod codec;
pub mod config;
pub mod files;
pub mod history;
pub mod store;

pub use codec::{decode, decode_str, encode, encode_json, BoardSnapshot, SNAPSHOT_VERSION};
pub use config::{load_config, save_config, WorkspaceConfig};
pub use files::{
    append_to_file, atomic_write, backup_file, board_file, config_file, ensure_workspace_dir,
    get_workspace_dir, history_file, init_local_workspace, log_file, read_file,
};
pub use history::{load_history, FileHistory, SessionHistory};
pub use store::{FileStore, MemoryStore, TaskStore};
