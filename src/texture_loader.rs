use std::io::Cursor;

use exif::{In, Reader, Tag, Value};
use tracing::debug;

/// Upright rotation for an EXIF orientation value. Mirrored orientations
/// (2, 4, 5, 7) are shown unrotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Clockwise90,
    Half,
    CounterClockwise90,
}

impl Rotation {
    pub fn from_orientation(orientation: u16) -> Rotation {
        match orientation {
            3 => Rotation::Half,
            6 => Rotation::Clockwise90,
            8 => Rotation::CounterClockwise90,
            _ => Rotation::None,
        }
    }

    /// Width and height after rotating an image of `size`.
    pub fn rotated_size(self, (width, height): (u32, u32)) -> (u32, u32) {
        match self {
            Rotation::Clockwise90 | Rotation::CounterClockwise90 => (height, width),
            Rotation::None | Rotation::Half => (width, height),
        }
    }
}

/// EXIF orientation of an encoded image, 1 (upright) when absent.
/// Only JPEG files carry it reliably.
pub fn read_orientation(bytes: &[u8], extension: &str) -> u16 {
    let extension = extension.to_lowercase();
    if extension != "jpg" && extension != "jpeg" {
        return 1;
    }
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(error = %e, "No usable EXIF data");
            return 1;
        }
    };
    match exif.get_field(Tag::Orientation, In::PRIMARY).map(|f| &f.value) {
        Some(Value::Short(values)) => values.first().copied().unwrap_or(1),
        _ => 1,
    }
}

#[cfg(feature = "desktop")]
pub use desktop::load_texture_with_exif_rotation;

#[cfg(feature = "desktop")]
mod desktop {
    use std::fs;
    use std::path::Path;

    use anyhow::{Context, Result, anyhow};
    use raylib::prelude::*;
    use tracing::debug;

    use super::{Rotation, read_orientation};

    /// Decode an image file into a GPU texture, upright.
    pub fn load_texture_with_exif_rotation(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        image_path: &Path,
    ) -> Result<Texture2D> {
        let file_bytes =
            fs::read(image_path).with_context(|| format!("Failed to read {}", image_path.display()))?;

        let extension = image_path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
        let rotation = Rotation::from_orientation(read_orientation(&file_bytes, &extension));

        // raylib wants the extension as a hint when loading from memory
        let mut image = Image::load_image_from_mem(&format!(".{extension}"), &file_bytes)
            .map_err(|e| anyhow!("Failed to decode {}: {e}", image_path.display()))?;

        match rotation {
            Rotation::Half => {
                image.rotate_cw();
                image.rotate_cw();
            }
            Rotation::Clockwise90 => image.rotate_cw(),
            Rotation::CounterClockwise90 => image.rotate_ccw(),
            Rotation::None => {}
        }
        if rotation != Rotation::None {
            debug!(path = %image_path.display(), ?rotation, "Applied EXIF rotation");
        }

        rl.load_texture_from_image(thread, &image)
            .map_err(|e| anyhow!("Failed to create texture for {}: {e}", image_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_maps_to_rotation() {
        assert_eq!(Rotation::from_orientation(1), Rotation::None);
        assert_eq!(Rotation::from_orientation(3), Rotation::Half);
        assert_eq!(Rotation::from_orientation(6), Rotation::Clockwise90);
        assert_eq!(Rotation::from_orientation(8), Rotation::CounterClockwise90);
        assert_eq!(Rotation::from_orientation(5), Rotation::None);
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        assert_eq!(Rotation::Clockwise90.rotated_size((1920, 1080)), (1080, 1920));
        assert_eq!(Rotation::Half.rotated_size((1920, 1080)), (1920, 1080));
    }

    #[test]
    fn non_jpeg_or_broken_data_is_upright() {
        assert_eq!(read_orientation(b"\x89PNG\r\n\x1a\n", "png"), 1);
        assert_eq!(read_orientation(b"not a jpeg at all", "JPG"), 1);
        assert_eq!(read_orientation(&[], "jpeg"), 1);
    }
}
