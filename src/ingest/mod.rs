pub mod image_loader;
pub mod preview;

pub use image_loader::{load_image_file, load_image_folder, mime_for_path, IMAGE_EXTENSIONS};
pub use preview::{decode_preview, decode_preview_async, spawn_preview};
