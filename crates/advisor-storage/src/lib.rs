pub mod keys;
pub mod object;
pub mod provider;

pub use keys::{
    chat_file_key, chat_files_prefix, customer_prefix, prompt_key, upload_key, validate_segment,
    CHAT_FILES_DIR, PROMPT_FILE_NAME,
};
pub use object::{ObjectBlobStore, S3Config};
pub use provider::{BlobStore, Result, StorageError};
