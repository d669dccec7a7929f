use loupe::prelude::*;
use loupe::TensorError;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn storage_survives_until_the_last_view_drops() -> anyhow::Result<()> {
    init_logs();
    let base = Tensor1D::<f32>::arange(20)?;
    let a = base.slice(Slice::range(0, 10))?;
    let b = base.slice(Slice::range(10, 20))?;
    let c = b.slice(Slice::stepped(3))?;
    assert_eq!(base.ref_count(), 4);

    // Dropping all but one view leaves the data intact and readable.
    drop(base);
    drop(a);
    drop(b);
    assert_eq!(c.ref_count(), 1);
    assert_eq!(c.to_vec(), vec![10.0, 13.0, 16.0, 19.0]);
    Ok(())
}

#[test]
fn slice_then_slice_again() -> anyhow::Result<()> {
    let t = Tensor1D::<f32>::arange(20)?;
    let s = t.slice(Slice::new(5, 15, 2))?;
    assert_eq!(s.to_vec(), vec![5.0, 7.0, 9.0, 11.0, 13.0]);

    // The second end bound exceeds the first slice's extent and clips.
    let ss = s.slice(Slice::new(2, 7, 1))?;
    assert_eq!(ss.to_vec(), vec![9.0, 11.0, 13.0]);
    Ok(())
}

#[test]
fn negative_index_equals_wrapped_positive() -> anyhow::Result<()> {
    let t = Tensor1D::<f32>::arange(5)?;
    assert_eq!(t.get(-1)?, t.get(4)?);
    Ok(())
}

#[test]
fn reshape_then_dot_produces_the_full_product() -> anyhow::Result<()> {
    init_logs();
    let flat = Tensor1D::<f32>::arange(10)?;
    let lhs = flat.reshape(5, 2)?;
    let rhs = flat.reshape(2, 5)?;
    let out = lhs.dot(&rhs)?;
    assert_eq!(out.shape(), [5, 5]);
    for i in 0..5isize {
        for j in 0..5isize {
            let mut expected = 0.0;
            for k in 0..2isize {
                expected += lhs.get(i, k)? * rhs.get(k, j)?;
            }
            assert_eq!(out.get(i, j)?, expected);
        }
    }
    Ok(())
}

#[test]
fn length_one_operand_broadcasts() -> anyhow::Result<()> {
    let a = Tensor1D::<f32>::arange(5)?;
    let k = Tensor1D::from_data(&[3.0f32])?;
    let out = a.add(&k)?;
    assert_eq!(out.to_vec(), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    Ok(())
}

#[test]
fn mismatched_columns_report_and_allocate_nothing() -> anyhow::Result<()> {
    let a = Tensor2D::<f32>::arange(6)?.reshape(2, 3)?;
    let b = Tensor2D::<f32>::arange(8)?.reshape(2, 4)?;
    let before = (a.ref_count(), b.ref_count());
    assert!(matches!(a.add(&b), Err(TensorError::ShapeMismatch { .. })));
    // The failed op retained nothing.
    assert_eq!((a.ref_count(), b.ref_count()), before);
    Ok(())
}

#[test]
fn rendering_reflects_mutation() -> anyhow::Result<()> {
    let t = Tensor1D::<f32>::arange(3)?;
    assert_eq!(t.to_string(), "[0.0, 1.0, 2.0]");
    t.set(0, 9.0)?;
    assert_eq!(t.to_string(), "[9.0, 1.0, 2.0]");

    let m = Tensor2D::<f32>::arange(4)?.reshape(2, 2)?;
    assert_eq!(m.to_string(), "[[0.0, 1.0]\n [2.0, 3.0]]");
    m.set(1, 1, 7.0)?;
    assert_eq!(m.to_string(), "[[0.0, 1.0]\n [2.0, 7.0]]");
    Ok(())
}

#[test]
fn writes_through_views_are_seen_by_the_base() -> anyhow::Result<()> {
    let base = Tensor1D::<f32>::arange(20)?;
    let view = base.slice(Slice::range(5, 15))?;
    view.set(0, 100.0)?;
    view.set(-1, 200.0)?;
    assert_eq!(base.get(5)?, 100.0);
    assert_eq!(base.get(14)?, 200.0);
    Ok(())
}

/// Chained slices over `arange(n)`, mirrored against a naive model that
/// wraps, clamps, and walks a materialized vector.
#[test]
fn slice_of_slice_grid() -> anyhow::Result<()> {
    type Params = (Option<isize>, Option<isize>, isize);

    fn naive(v: &[f32], (start, end, step): Params) -> Vec<f32> {
        let extent = v.len() as isize;
        let clamp = |ix: Option<isize>, default: isize| {
            let ix = ix.unwrap_or(default);
            let wrapped = if ix < 0 { ix + extent } else { ix };
            wrapped.clamp(0, extent)
        };
        let (lo, hi) = (clamp(start, 0), clamp(end, extent));
        let mut out = Vec::new();
        let mut i = lo;
        while i < hi {
            out.push(v[i as usize]);
            i += step;
        }
        out
    }

    fn as_slice((start, end, step): Params) -> Slice {
        Slice::new(start.unwrap_or(0), end.unwrap_or(isize::MAX), step)
    }

    let cases: &[(Params, Params)] = &[
        ((Some(5), Some(15), 1), (Some(2), Some(7), 1)),
        ((Some(5), Some(15), 1), (None, None, 1)),
        ((Some(5), Some(15), 1), (None, None, 2)),
        ((Some(5), Some(15), 2), (None, None, 2)),
        ((Some(0), Some(20), 1), (Some(-5), None, 1)),
        ((Some(0), Some(20), 1), (None, Some(-5), 1)),
        ((Some(0), Some(20), 1), (Some(-15), Some(-5), 1)),
        ((Some(5), Some(15), 1), (Some(100), None, 1)),
        ((Some(5), Some(15), 1), (None, Some(100), 1)),
        ((Some(5), Some(15), 1), (None, Some(-100), 1)),
        ((Some(0), Some(20), 1), (Some(0), Some(0), 1)),
        ((Some(0), Some(0), 1), (None, None, 1)),
        ((Some(5), Some(25), 1), (Some(3), Some(15), 1)),
        ((Some(0), None, 3), (Some(2), None, 2)),
    ];

    for &(first, second) in cases {
        let t = Tensor1D::<f32>::arange(20)?;
        let expected = naive(&naive(&t.to_vec(), first), second);
        let got = t.slice(as_slice(first))?.slice(as_slice(second))?;
        assert_eq!(got.to_vec(), expected, "{:?} then {:?}", first, second);
    }
    Ok(())
}

#[test]
fn long_slice_chain() -> anyhow::Result<()> {
    let t = Tensor1D::<f32>::arange(100)?;
    let chained = t
        .slice(Slice::new(10, 90, 2))?
        .slice(Slice::new(5, 35, 3))?
        .slice(Slice::stepped(2))?;
    // t[10:90:2][5:35:3][::2]
    let expected: Vec<f32> = (0..100)
        .skip(10)
        .step_by(2)
        .take(40)
        .skip(5)
        .step_by(3)
        .take(10)
        .step_by(2)
        .map(|v| v as f32)
        .collect();
    assert_eq!(chained.to_vec(), expected);
    Ok(())
}
