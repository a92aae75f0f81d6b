//! # Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc, serde::ts_milliseconds};
use image::{DynamicImage, ImageResult, RgbImage};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An encoded frame as delivered by a camera.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CamFrame {
    /// The camera which produced this frame
    pub cam_id: CamId,

    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// The format of this frame
    pub format: ImageFormat,

    /// The formatted image data
    pub data: Vec<u8>
}

/// A decoded camera image, ready for classification.
#[derive(Clone)]
pub struct CamImage {
    /// The camera which produced this image
    pub cam_id: CamId,

    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself, as 8 bit RGB pixels
    pub image: RgbImage
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Cameras available on the vehicle
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, Eq, PartialEq)]
pub enum CamId {
    /// The processed colour stream of the front camera, used in simulation.
    FrontColour,

    /// The raw stream of the front camera, used on the physical vehicle.
    FrontRaw,
}

/// Possible formats for camera images. This is used rather than image::ImageFormat to:
///     1. Restrict the formats that can be sent back and forth
///     2. Allow serialisation as image::ImageFormat does not implement serde.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub enum ImageFormat {
    /// PNG image
    Png,

    /// JPEG image with a quality value between 1 and 100, where 100 is best.
    Jpeg(u8)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamFrame {
    /// Decode this camera frame into an RGB camera image.
    ///
    /// Frames with an alpha channel or in greyscale are converted to RGB.
    pub fn to_cam_image(&self) -> ImageResult<CamImage>  {
        let format = match self.format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg(_) => image::ImageFormat::Jpeg
        };

        let image = image::load_from_memory_with_format(&self.data, format)?;

        Ok(CamImage {
            cam_id: self.cam_id,
            timestamp: self.timestamp,
            image: image.to_rgb8()
        })
    }
}

impl CamImage {
    /// Encode this camera image into a camera frame with the given format
    pub fn to_cam_frame(&self, format: ImageFormat) -> ImageResult<CamFrame> {
        let mut data = Vec::<u8>::new();

        let output_format = match format {
            ImageFormat::Png => image::ImageOutputFormat::Png,
            ImageFormat::Jpeg(q)  => image::ImageOutputFormat::Jpeg(q)
        };

        DynamicImage::ImageRgb8(self.image.clone()).write_to(&mut data, output_format)?;

        Ok(CamFrame {
            cam_id: self.cam_id,
            timestamp: self.timestamp,
            format,
            data
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_decode() {
        // A small image with a single red pixel in the middle
        let mut image = RgbImage::new(3, 3);
        image.put_pixel(1, 1, image::Rgb([255, 0, 0]));

        let cam_image = CamImage {
            cam_id: CamId::FrontColour,
            timestamp: Utc::now(),
            image
        };

        let frame = cam_image.to_cam_frame(ImageFormat::Png).unwrap();
        let decoded = frame.to_cam_image().unwrap();

        assert_eq!(decoded.cam_id, CamId::FrontColour);
        assert_eq!(decoded.image.dimensions(), (3, 3));
        assert_eq!(decoded.image.get_pixel(1, 1), &image::Rgb([255, 0, 0]));
        assert_eq!(decoded.image.get_pixel(0, 0), &image::Rgb([0, 0, 0]));

        // Garbage data is an error, not a panic
        let bad = CamFrame { data: vec![1, 2, 3], ..frame };
        assert!(bad.to_cam_image().is_err());
    }
}
