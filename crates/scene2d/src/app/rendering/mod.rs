mod framebuffer;
mod pixels_surface;
mod raster;
mod surface;
mod transform;

pub use framebuffer::FrameBuffer;
pub use pixels_surface::PixelsSurface;
pub use surface::{
    DrawingSurface, SurfaceDefaults, Transform2D, DEFAULT_FONT, IDENTITY_TRANSFORM,
};
pub use transform::{CameraWindow, Viewport};
