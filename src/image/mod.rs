pub mod io;
pub mod planes;
pub mod raster;
pub mod roi;
pub mod traits;
pub mod wrapper;

pub use self::planes::{Plane, PlaneF32, PlaneF64, Planes, Sample, Widened, Working};
pub use self::raster::{Raster, MAX_CHANNELS, MAX_SIDE};
pub use self::roi::{Rect, Roi};
pub use self::traits::ImageView;
pub use self::wrapper::Image;
