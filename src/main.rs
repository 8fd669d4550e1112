use ndarray::ArrayD;

use volume2dicom::{FrameOfReference, Volume};

fn main() {
    // 101x101 mm in-plane, 300 mm long water phantom at unit spacing
    let frame = FrameOfReference::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (101, 101, 300));
    let data = ArrayD::ones(vec![300, 101, 101]);
    let volume =
        Volume::from_array_in_frame(data, frame).expect("array should match the frame of reference");
    println!("volume shape: {:?}", volume.dim());
    volume
        .to_dicom("water_phantom")
        .expect("should have written the series");
}
