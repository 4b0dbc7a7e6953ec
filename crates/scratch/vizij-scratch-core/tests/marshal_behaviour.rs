use vizij_scratch_core::{
    BufferStore, Marshaller, MemoryHost, ScratchConfig, ScratchError, ScratchStats, Source,
    ViewKind,
};

fn fresh() -> Marshaller<MemoryHost> {
    Marshaller::in_memory().expect("default config is valid")
}

#[test]
fn ensure_capacity_twice_reallocates_once() {
    let mut store = BufferStore::new(MemoryHost, &ScratchConfig::default()).unwrap();
    store.ensure_capacity(1000).unwrap();
    store.ensure_capacity(1000).unwrap();
    assert_eq!(store.generation(), 1);
    assert_eq!(store.capacity(), 1024);
}

#[test]
fn small_request_is_narrowed_not_grown() {
    let mut m = fresh();
    let data = [9u8; 10];
    let v = m.from_bytes(10, Some(&data)).unwrap();
    assert_eq!(v.len(), 10);
    assert_eq!(m.capacity(), 16);
    assert_eq!(m.generation(), 0);
}

#[test]
fn growth_doubles_to_128_and_returns_exact_length() {
    let mut m = fresh();
    let data: Vec<u8> = (0..100).collect();
    let v = m.from_bytes(100, Some(&data)).unwrap();
    assert_eq!(m.capacity(), 128);
    assert_eq!(m.generation(), 1);
    assert_eq!(v.len(), 100);
    assert_eq!(v.to_bytes(), data);
}

#[test]
fn absent_source_copies_nothing_but_still_returns_view() {
    let mut m = fresh();
    let bytes = m.from_bytes(5, None).unwrap();
    let words = m.from_words16(3, None).unwrap();
    let words32 = m.from_words32(3, None).unwrap();
    let raw = m.floats_as_bytes(2, None).unwrap();
    let floats = m.float_view(40, None).unwrap();
    let empty = m.float_view(4, Some(&[])).unwrap();

    assert_eq!(bytes.len(), 5);
    assert_eq!(words.len(), 6);
    assert_eq!(words32.len(), 12);
    assert_eq!(raw.len(), 8);
    assert_eq!(floats.len(), 40);
    assert_eq!(empty.len(), 4);
    assert_eq!(m.stats().copies, 0);
}

#[test]
fn byte_write_is_visible_through_float_view() {
    let mut m = fresh();
    m.from_bytes(4, Some(&[1, 0, 0, 0])).unwrap();
    let floats = m.float_view(1, None).unwrap();
    assert_eq!(m.view_generation(ViewKind::Float32), Some(m.generation()));

    let bits = floats.to_f32().unwrap()[0].to_bits();
    assert_eq!(bits, u32::from_ne_bytes([1, 0, 0, 0]));
}

#[test]
fn float_values_round_trip_bit_exact() {
    let mut m = fresh();
    let data = [
        0.0f32,
        -0.0,
        1.5,
        f32::MIN_POSITIVE,
        f32::MAX,
        f32::INFINITY,
        f32::from_bits(0x7fc0_0001),
    ];
    let v = m.float_view(data.len(), Some(&data)).unwrap();
    let back = v.to_f32().unwrap();
    let want: Vec<u32> = data.iter().map(|f| f.to_bits()).collect();
    let got: Vec<u32> = back.iter().map(|f| f.to_bits()).collect();
    assert_eq!(got, want);
}

#[test]
fn floats_as_bytes_carry_raw_bit_patterns() {
    let mut m = fresh();
    let v = m.floats_as_bytes(2, Some(&[1.0, -2.0])).unwrap();
    let mut want = 1.0f32.to_ne_bytes().to_vec();
    want.extend_from_slice(&(-2.0f32).to_ne_bytes());
    assert_eq!(v.to_bytes(), want);
}

#[test]
fn words16_travel_as_byte_pairs() {
    let mut m = fresh();
    let indices = [0u16, 1, 2, 2, 3, 0, 0xffff];
    let v = m.from_words16(indices.len(), Some(&indices)).unwrap();
    assert_eq!(v.element_width(), 1);
    assert_eq!(v.len(), 14);
    assert_eq!(v.read_as::<u16>().unwrap(), indices);
}

#[test]
fn growth_replaces_storage_of_earlier_views() {
    let mut m = fresh();
    let before = m.float_view(2, Some(&[1.0, 2.0])).unwrap();
    let after = m.float_view(64, None).unwrap();
    assert!(!before.shares_storage_with(&after));
    // The earlier view still reads its own generation's bytes.
    assert_eq!(before.to_f32().unwrap(), vec![1.0, 2.0]);
    assert_eq!(m.view_generation(ViewKind::Float32), Some(1));
}

#[test]
fn later_calls_overwrite_from_offset_zero() {
    let mut m = fresh();
    let first = m.from_bytes(4, Some(&[1, 2, 3, 4])).unwrap();
    m.from_bytes(2, Some(&[9, 9])).unwrap();
    assert_eq!(first.to_bytes(), vec![9, 9, 3, 4]);
}

#[test]
fn view_of_sizes_to_source_length() {
    let mut m = fresh();
    let data: Vec<u16> = (0..50).collect();
    let v = m.view_of(Source::U16(&data)).unwrap();
    assert_eq!(v.len(), 100);
    assert_eq!(v.read_as::<u16>().unwrap(), data);
    assert_eq!(m.capacity(), 128);
}

#[test]
fn request_beyond_max_is_overflow_and_keeps_state() {
    let cfg = ScratchConfig::default().with_max_capacity(256);
    let mut m = Marshaller::with_config(MemoryHost, &cfg).unwrap();
    m.from_bytes(200, None).unwrap();
    assert_eq!(m.capacity(), 256);

    let err = m.float_view(100, None).unwrap_err();
    assert_eq!(
        err,
        ScratchError::CapacityOverflow {
            requested: 400,
            max: 256
        }
    );
    assert_eq!(m.capacity(), 256);
    assert_eq!(m.generation(), 1);
}

#[test]
fn stats_track_reallocations_copies_and_rebuilds() {
    let mut m = fresh();
    m.from_bytes(8, Some(&[0; 8])).unwrap();
    m.float_view(2, Some(&[0.5, 0.25])).unwrap();
    m.from_bytes(33, None).unwrap();
    m.float_view(1, None).unwrap();

    assert_eq!(
        m.stats(),
        ScratchStats {
            capacity: 64,
            generation: 1,
            reallocations: 1,
            copies: 2,
            // bytes + float at generation 0, bytes + float at generation 1
            view_rebuilds: 4,
        }
    );
}

#[test]
fn instances_are_independent() {
    let mut a = fresh();
    let mut b = fresh();
    a.from_bytes(500, None).unwrap();
    let vb = b.from_bytes(4, Some(&[4, 3, 2, 1])).unwrap();
    assert_eq!(a.capacity(), 512);
    assert_eq!(b.capacity(), 16);
    assert_eq!(vb.to_bytes(), vec![4, 3, 2, 1]);
}
