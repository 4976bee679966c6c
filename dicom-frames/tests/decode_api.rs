use std::ffi::c_char;
use std::slice;

use dicom_frames::ffi::{
    c_decode_frames, c_decode_single_frame, c_free_pixel_data, c_get_pixel_data,
};
use dicom_frames::{
    decode_multi_frame, decode_single_frame, extract_pixel_data, to_dynamic_image, Error,
    ImageDescriptor, PhotometricInterpretation, PixelFormat, PixelRepresentation, Status,
    TransferSyntax,
};
use dicom_pixeldata::PixelDecoder;

#[allow(dead_code)]
#[path = "../src/test_support.rs"]
mod test_support;

use test_support::{
    dicom_file, encapsulated_gray8, gradient, gradient16, le_bytes, rle_encode_gray16,
    rle_encode_gray8,
};

const RLE_LOSSLESS_UID: &str = "1.2.840.10008.1.2.5";

fn gray16_descriptor_json(dims: &str) -> String {
    format!(
        r#"{{
            "dims": {dims},
            "photometric": "MONOCHROME2",
            "transfer_syntax": "{RLE_LOSSLESS_UID}",
            "samples_per_pixel": 1,
            "bits_allocated": 16,
            "bits_stored": 12,
            "high_bit": 11,
            "pixel_representation": 0
        }}"#
    )
}

#[test]
fn single_frame_from_json_descriptor() {
    let descriptor = ImageDescriptor::from_json(&gray16_descriptor_json("[16, 4]")).unwrap();
    let samples: Vec<u16> = gradient16(16, 4, 3).iter().map(|s| s & 0x0FFF).collect();

    let decoded = decode_single_frame(&rle_encode_gray16(&samples), descriptor.clone()).unwrap();
    assert_eq!(decoded, le_bytes(&samples));

    let img = to_dynamic_image(&decoded, &descriptor, 0).unwrap();
    assert_eq!(img.as_luma16().unwrap().as_raw(), &samples);
}

#[test]
fn multi_frame_volume_concatenates_frames() {
    let descriptor = ImageDescriptor::from_json(&gray16_descriptor_json("[4, 4, 3]")).unwrap();
    let frames: Vec<Vec<u16>> = (0..3).map(|f| gradient16(4, 4, f * 400)).collect();
    let fragments: Vec<Vec<u8>> = frames.iter().map(|f| rle_encode_gray16(f)).collect();
    let fragment_refs: Vec<&[u8]> = fragments.iter().map(Vec::as_slice).collect();

    let decoded = decode_multi_frame(&fragment_refs, descriptor).unwrap();
    assert_eq!(decoded.len(), 4 * 4 * 3 * 2);
    assert_eq!(decoded, le_bytes(&frames.concat()));
}

#[test]
fn single_frame_matches_direct_decode() {
    let pixels = gradient(64, 48);
    let fragment = rle_encode_gray8(&pixels);
    let descriptor = ImageDescriptor::single_frame(
        64,
        48,
        PhotometricInterpretation::Monochrome2,
        TransferSyntax::RleLossless,
        PixelFormat::monochrome(8, PixelRepresentation::Unsigned),
    );

    let decoded = decode_single_frame(&fragment, descriptor).unwrap();

    let reference = encapsulated_gray8(64, 48, &fragment, RLE_LOSSLESS_UID);
    let direct = reference.decode_pixel_data().unwrap();
    assert_eq!(decoded.len(), 64 * 48);
    assert_eq!(decoded.as_slice(), &direct.data()[..64 * 48]);
}

#[test]
fn single_fragment_with_volume_dims_is_rejected() {
    let descriptor = ImageDescriptor::multi_frame(
        4,
        4,
        1,
        PhotometricInterpretation::Monochrome2,
        TransferSyntax::RleLossless,
        PixelFormat::monochrome(16, PixelRepresentation::Unsigned),
    );

    let err = decode_single_frame(&rle_encode_gray16(&gradient16(4, 4, 0)), descriptor)
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
    assert_eq!(err.status(), Status::DecodeFailed);
}

#[test]
fn stream_extraction_matches_stored_pixels() {
    let pixels = gradient(8, 6);
    let stream = dicom_file(8, 6, &pixels);

    assert_eq!(extract_pixel_data(&stream).unwrap(), pixels);
}

#[test]
fn truncated_stream_is_unreadable() {
    let err = extract_pixel_data(&[0u8; 140]).unwrap_err();
    assert_eq!(err.status(), Status::Unreadable);
}

#[test]
fn c_entry_points_hand_out_and_release_buffers() {
    let samples = gradient16(12, 10, 7);
    let fragment = rle_encode_gray16(&samples);

    unsafe {
        let mut data = c_decode_single_frame(
            fragment.as_ptr() as *const c_char,
            fragment.len(),
            12,
            10,
            PhotometricInterpretation::Monochrome2.code(),
            TransferSyntax::RleLossless.code(),
            1,
            16,
            16,
            15,
            0,
        );
        assert_eq!(data.status, Status::Success.code());
        let bytes = slice::from_raw_parts(data.buffer as *const u8, data.size);
        assert_eq!(bytes, le_bytes(&samples).as_slice());
        c_free_pixel_data(&mut data);
        assert!(data.buffer.is_null());

        let truncated = &fragment[..fragment.len() / 3];
        let ptrs = [truncated.as_ptr() as *const c_char, fragment.as_ptr() as *const c_char];
        let lens = [truncated.len(), fragment.len()];
        let dims = [12, 10, 2];
        let mut data = c_decode_frames(
            ptrs.as_ptr(),
            lens.as_ptr(),
            2,
            dims.as_ptr(),
            PhotometricInterpretation::Monochrome2.code(),
            TransferSyntax::RleLossless.code(),
            1,
            16,
            16,
            15,
            0,
        );
        assert_eq!(data.status, Status::DecodeFailed.code());
        assert!(data.buffer.is_null());
        assert_eq!(data.size, 0);
        c_free_pixel_data(&mut data);
    }
}

#[test]
fn c_stream_entry_point_reports_unreadable_input() {
    let stream = dicom_file(5, 5, &gradient(5, 5));

    unsafe {
        let mut data = c_get_pixel_data(stream.as_ptr() as *const c_char, stream.len());
        assert_eq!(data.status, Status::Success.code());
        assert_eq!(data.size, 25);
        c_free_pixel_data(&mut data);

        let junk = [0x42u8; 64];
        let data = c_get_pixel_data(junk.as_ptr() as *const c_char, junk.len());
        assert_eq!(data.status, Status::Unreadable.code());
        assert!(data.buffer.is_null());
    }
}
