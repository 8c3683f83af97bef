mod common;

use common::init_logging;
use common::synthetic_image::{checkerboard_u8, load_via_png};
use cv_image::image::Planes;
use cv_image::prelude::*;
use cv_image::ImageError;

#[test]
fn blank_color_image_survives_erode() {
    init_logging();
    let img = Image::new(64, 64, Depth::U8, 3).unwrap();
    let eroded = img.erode(2).unwrap();
    let info = eroded.info().unwrap();
    assert_eq!((info.width, info.height, info.channels), (64, 64, 3));
    assert_eq!(info.depth, Depth::U8);
}

#[test]
fn pyramid_round_trip_restores_even_size() {
    init_logging();
    for (w, h) in [(64, 48), (10, 2), (128, 256)] {
        let img = Image::new(w, h, Depth::U8, 1).unwrap();
        let back = img
            .pyr_down(PyramidFilter::Gaussian5x5)
            .and_then(|down| down.pyr_up(PyramidFilter::Gaussian5x5))
            .unwrap();
        let info = back.info().unwrap();
        assert_eq!((info.width, info.height), (w, h));
    }
}

#[test]
fn canny_leaves_checkerboard_untouched() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let img = load_via_png(
        dir.path(),
        "board.png",
        &checkerboard_u8(96, 64, 16),
        LoadMode::Grayscale,
    );
    let before = img.raster().unwrap().planes().clone();
    let edges = img.canny(40.0, 120.0, 3).unwrap();
    assert_eq!(img.raster().unwrap().planes(), &before);

    let Planes::U8(planes) = edges.raster().unwrap().planes() else {
        panic!("canny output must be 8-bit");
    };
    // cell boundaries produce edges, cell interiors do not
    assert!(planes[0].pixels().filter(|p| p[0] == 255).count() > 100);
    assert_eq!(planes[0].get_pixel(8, 8)[0], 0);
}

#[test]
fn filters_chain_on_loaded_image() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let img = load_via_png(
        dir.path(),
        "board.png",
        &checkerboard_u8(64, 64, 8),
        LoadMode::Color,
    );
    assert_eq!(img.info().unwrap().channels, 3);

    let smoothed = img.smooth(SmoothType::Median, SmoothParams::new(3, 0, 0.0, 0.0)).unwrap();
    let opened = smoothed.open(DEFAULT_ITERATIONS).unwrap();
    let sobel = opened.sobel(1, 1, 5).unwrap();
    let info = sobel.info().unwrap();
    assert_eq!(info.depth, Depth::I16);
    assert_eq!(info.channels, 3);
    let laplace = img.laplace(3).unwrap();
    assert_eq!(laplace.info().unwrap(), info);
}

#[test]
fn uninitialised_image_rejects_every_operation() {
    init_logging();
    let img = Image::default();
    let mut other = Image::new(4, 4, Depth::U8, 1).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let results = [
        img.info().map(|_| ()),
        img.roi().map(|_| ()),
        img.try_clone().map(|_| ()),
        img.smooth(SmoothType::Blur, SmoothParams::default()).map(|_| ()),
        img.laplace(3).map(|_| ()),
        img.sobel(1, 0, 3).map(|_| ()),
        img.erode(1).map(|_| ()),
        img.dilate(1).map(|_| ()),
        img.open(1).map(|_| ()),
        img.close(1).map(|_| ()),
        img.gradient(1).map(|_| ()),
        img.top_hat(1).map(|_| ()),
        img.black_hat(1).map(|_| ()),
        img.resize(&mut other, Interpolation::Linear),
        img.pyr_down(PyramidFilter::Gaussian5x5).map(|_| ()),
        img.pyr_up(PyramidFilter::Gaussian5x5).map(|_| ()),
        img.canny(10.0, 20.0, 3).map(|_| ()),
        img.save(dir.path().join("never.png"), LoadMode::Unchanged),
    ];
    for (i, res) in results.into_iter().enumerate() {
        assert!(
            matches!(res, Err(ImageError::InternalConsistency(_))),
            "operation #{i} did not report a missing raster: {res:?}"
        );
    }

    let mut img = Image::default();
    assert!(matches!(
        img.set_roi(0, 0, 1, 1),
        Err(ImageError::InternalConsistency(_))
    ));
    assert!(matches!(img.reset_roi(), Err(ImageError::InternalConsistency(_))));
}
