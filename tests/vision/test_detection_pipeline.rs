// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection pipeline tests without a model: letterbox geometry, output
//! decoding and overlay persistence wired together

use footscan_api::storage::{annotated_file_name, AnnotatedImageStore};
use footscan_api::vision::yolo::{decode_output, letterbox, DecodeParams};
use footscan_api::vision::{encode_png, LabelMap, OverlayRenderer};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array3;
use tempfile::TempDir;

fn gray(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
}

#[test]
fn test_raw_head_boxes_map_back_to_original_pixels() {
    // 1280x640 letterboxes into 640x320 with 160px bars top and bottom
    let image = gray(1280, 640);
    let (tensor, geometry) = letterbox(&image, 640).unwrap();
    assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
    assert_eq!(geometry.scale, 0.5);
    assert_eq!(geometry.pad_y, 160.0);

    // [1, 4 + 2 classes, 3 anchors]: cx, cy, w, h, score0, score1
    let mut output = Array3::<f32>::zeros((1, 6, 3));
    let anchors = [
        [100.0, 260.0, 100.0, 100.0, 0.9, 0.1], // kept, class 0
        [104.0, 262.0, 100.0, 100.0, 0.8, 0.1], // overlaps first, suppressed
        [500.0, 300.0, 40.0, 20.0, 0.05, 0.1],  // below threshold
    ];
    for (i, anchor) in anchors.iter().enumerate() {
        for (c, value) in anchor.iter().enumerate() {
            output[[0, c, i]] = *value;
        }
    }

    let detections = decode_output(output.view().into_dyn(), DecodeParams::default()).unwrap();
    assert_eq!(detections.len(), 1);

    let restored = geometry.restore(detections[0]);
    assert_eq!(restored.class_id, 0);
    assert!((restored.x1 - 100.0).abs() < 1e-3);
    assert!((restored.y1 - 100.0).abs() < 1e-3);
    assert!((restored.x2 - 300.0).abs() < 1e-3);
    assert!((restored.y2 - 300.0).abs() < 1e-3);
}

#[test]
fn test_nms_exported_rows() {
    let mut output = Array3::<f32>::zeros((1, 3, 6));
    let rows = [
        [10.0, 10.0, 50.0, 50.0, 0.7, 1.0],
        [60.0, 60.0, 90.0, 90.0, 0.9, 0.0],
        [0.0, 0.0, 5.0, 5.0, 0.1, 0.0],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            output[[0, r, c]] = *value;
        }
    }

    let detections = decode_output(output.view().into_dyn(), DecodeParams::default()).unwrap();
    assert_eq!(detections.len(), 2);
    // rows keep model order even when a later row is more confident
    assert_eq!(detections[0].class_id, 1);
    assert!((detections[0].confidence - 0.7).abs() < 1e-6);
    assert_eq!(detections[1].class_id, 0);
    assert!((detections[1].confidence - 0.9).abs() < 1e-6);
}

#[test]
fn test_unknown_output_shape_is_rejected() {
    let output = Array3::<f32>::zeros((1, 3, 10));
    assert!(decode_output(output.view().into_dyn(), DecodeParams::default()).is_err());
}

#[test]
fn test_overlay_round_trips_through_store() {
    let dir = TempDir::new().unwrap();
    let store = AnnotatedImageStore::new(dir.path()).unwrap();

    let image = gray(120, 80);
    let detections = vec![footscan_api::vision::RawDetection {
        x1: 10.0,
        y1: 10.0,
        x2: 60.0,
        y2: 50.0,
        confidence: 0.88,
        class_id: 0,
    }];
    let canvas = OverlayRenderer::without_labels().render(
        &image,
        &detections,
        &LabelMap::detection_default(),
    );
    let png = encode_png(&DynamicImage::ImageRgb8(canvas)).unwrap();

    let name = annotated_file_name(Some("uploads/right foot.jpeg"));
    assert_eq!(name, "annotated_right foot.png");
    store.save(&name, &png).unwrap();

    let path = store.resolve(&name).unwrap();
    let decoded = image::open(path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 80));
    assert_ne!(decoded.to_rgb8().get_pixel(10, 30), &Rgb([128, 128, 128]));
}
