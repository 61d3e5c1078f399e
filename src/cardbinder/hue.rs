//! # Hue Collaborator
//!
//! Turns a card image into a single dominant hue angle, used as the sort key by
//! [`crate::sort`]. The binder only depends on the [`HueSource`] trait;
//! [`ImageHue`] is the production implementation that downloads (or reads) the
//! image and samples its pixels.
//!
//! Failures never propagate: an image that cannot be fetched or decoded simply
//! has no hue (`None`), and sorts after every card that does.

use image::GenericImageView;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

const SAMPLE_MAX_WIDTH: u32 = 100;
const SAMPLE_MAX_HEIGHT: u32 = 140;
const TARGET_SAMPLES: u32 = 1000;
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Anything that can tell the dominant hue of an image URL.
pub trait HueSource {
    /// Hue in degrees `[0, 360)`, or `None` when it cannot be computed.
    fn hue(&mut self, image_url: &str) -> Option<f64>;
}

/// Fetches and samples images, memoising results (failures included) by URL.
pub struct ImageHue {
    client: Option<reqwest::blocking::Client>,
    cache: HashMap<String, Option<f64>>,
}

impl Default for ImageHue {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageHue {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| warn!("could not build HTTP client for hue sampling: {}", e))
            .ok();
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self, image_url: &str) -> Option<Option<f64>> {
        self.cache.get(image_url).copied()
    }

    fn fetch(&self, image_url: &str) -> Option<Vec<u8>> {
        if image_url.starts_with("http://") || image_url.starts_with("https://") {
            let client = self.client.as_ref()?;
            let response = client
                .get(image_url)
                .send()
                .map_err(|e| warn!("failed to fetch image {}: {}", image_url, e))
                .ok()?;
            if !response.status().is_success() {
                warn!("image {} returned status {}", image_url, response.status());
                return None;
            }
            return response
                .bytes()
                .map(|b| b.to_vec())
                .map_err(|e| warn!("failed to read image {}: {}", image_url, e))
                .ok();
        }
        if image_url.starts_with("data:") {
            debug!("inline data URLs are not sampled");
            return None;
        }
        let path = image_url.strip_prefix("file://").unwrap_or(image_url);
        fs::read(path)
            .map_err(|e| warn!("failed to read image {}: {}", path, e))
            .ok()
    }
}

impl HueSource for ImageHue {
    fn hue(&mut self, image_url: &str) -> Option<f64> {
        if let Some(hit) = self.cache.get(image_url) {
            return *hit;
        }
        let hue = self.fetch(image_url).and_then(|bytes| hue_of_image(&bytes));
        debug!("hue for {} = {:?}", image_url, hue);
        self.cache.insert(image_url.to_string(), hue);
        hue
    }
}

/// Average hue of an encoded image.
///
/// The image is shrunk to fit 100×140, roughly a thousand evenly spaced
/// pixels are averaged, and the hue of that average colour is returned.
pub fn hue_of_image(bytes: &[u8]) -> Option<f64> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| warn!("failed to decode image for hue: {}", e))
        .ok()?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let img = if width > SAMPLE_MAX_WIDTH || height > SAMPLE_MAX_HEIGHT {
        img.thumbnail(SAMPLE_MAX_WIDTH, SAMPLE_MAX_HEIGHT)
    } else {
        img
    };
    let rgb = img.to_rgb8();
    let pixels: Vec<&image::Rgb<u8>> = rgb.pixels().collect();
    let step = ((pixels.len() as u32) / TARGET_SAMPLES).max(1) as usize;

    let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
    for pixel in pixels.iter().step_by(step) {
        r += pixel[0] as u64;
        g += pixel[1] as u64;
        b += pixel[2] as u64;
        count += 1;
    }
    if count == 0 {
        return None;
    }

    let (h, _, _) = rgb_to_hsl(
        r as f64 / count as f64,
        g as f64 / count as f64,
        b as f64 / count as f64,
    );
    Some(h)
}

/// RGB in `[0, 255]` to HSL with hue in degrees and saturation/lightness in `[0, 1]`.
pub fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0 * 360.0, s, l)
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::HueSource;
    use std::collections::HashMap;

    /// Hue source backed by a fixed table; unknown URLs have no hue.
    #[derive(Default)]
    pub struct FixedHue {
        pub hues: HashMap<String, f64>,
        pub calls: Vec<String>,
    }

    impl FixedHue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, image_url: &str, hue: f64) -> Self {
            self.hues.insert(image_url.to_string(), hue);
            self
        }
    }

    impl HueSource for FixedHue {
        fn hue(&mut self, image_url: &str) -> Option<f64> {
            self.calls.push(image_url.to_string());
            self.hues.get(image_url).copied()
        }
    }
}
