use std::path::Path;

/// Builds the storage path for a recipe image.
///
/// The client filename contributes only its final extension; the stem is
/// replaced by the generated id, so stored paths never collide and never
/// leak the original filename. A filename without an extension yields a
/// path without one.
pub fn recipe_image_path(id: &str, original_filename: &str) -> String {
    match Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!("uploads/recipe/{id}.{ext}"),
        None => format!("uploads/recipe/{id}"),
    }
}
