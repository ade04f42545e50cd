//! Ordering
//!
//! Sorting and median routines that either reorder the elements of a slice
//! directly or leave the slice untouched and reorder a permutation of
//! indices into it. The permutation variants allow several orders of the
//! same data to exist at the same time.
//!
//! All algorithms work on "slots": elements for the direct variants and
//! indices for the permutation variants. Partitioning moves a hole through
//! the slots instead of swapping, and the pivot is the median of the first,
//! middle and last slot.

use crate::math::Float;
use crate::rng::Pcg32;
use std::cmp::Ordering;

/// Quicksort recursion depth after which the remaining segment is finished
/// with the iterative median partition and heapsort.
pub const QUICKSORT_MAX_RECURSION_DEPTH: usize = 1000;

/// Returns the identity permutation `[0, 1, ..., number - 1]`.
///
/// * `number` - Number of elements.
pub fn init_permutation(number: usize) -> Vec<usize> {
    (0..number).collect()
}

/// Sorts a permutation of indices so that `array[perm[i]] <= array[perm[i+1]]`.
/// The array is left untouched.
///
/// * `array` - The data.
/// * `order` - Ordering function.
/// * `perm`  - Permutation of indices into `array`.
pub fn permutation_quicksort<T, F>(array: &[T], order: F, perm: &mut [usize])
where
    F: Fn(&T, &T) -> Ordering,
{
    check_permutation(array, perm);
    let cmp = |a: &usize, b: &usize| order(&array[*a], &array[*b]);
    quicksort_slots(perm, &cmp, 0, QUICKSORT_MAX_RECURSION_DEPTH);
}

/// Reorders a permutation so that its middle entry refers to the median
/// element, lower entries to elements not greater and higher entries to
/// elements not smaller than it. The array is left untouched.
///
/// * `array` - The data.
/// * `order` - Ordering function.
/// * `perm`  - Permutation of indices into `array`.
pub fn permutation_quickmedian<T, F>(array: &[T], order: F, perm: &mut [usize])
where
    F: Fn(&T, &T) -> Ordering,
{
    check_permutation(array, perm);
    let cmp = |a: &usize, b: &usize| order(&array[*a], &array[*b]);
    quickmedian_slots(perm, &cmp);
}

/// Sorts a permutation of indices with heapsort. The array is left
/// untouched.
///
/// * `array` - The data.
/// * `order` - Ordering function.
/// * `perm`  - Permutation of indices into `array`.
pub fn permutation_heapsort<T, F>(array: &[T], order: F, perm: &mut [usize])
where
    F: Fn(&T, &T) -> Ordering,
{
    check_permutation(array, perm);
    let cmp = |a: &usize, b: &usize| order(&array[*a], &array[*b]);
    heapsort_slots(perm, &cmp);
}

/// Returns true if the permutation orders the array.
///
/// * `array` - The data.
/// * `order` - Ordering function.
/// * `perm`  - Permutation of indices into `array`.
pub fn permutation_is_correct<T, F>(array: &[T], order: F, perm: &[usize]) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    perm.windows(2)
        .all(|w| order(&array[w[0]], &array[w[1]]) != Ordering::Greater)
}

/// Sorts the elements of a slice in place.
///
/// * `array` - The data.
/// * `order` - Ordering function.
pub fn elements_quicksort<T: Clone, F>(array: &mut [T], order: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    quicksort_slots(array, &order, 0, QUICKSORT_MAX_RECURSION_DEPTH);
}

/// Moves the median element of a slice to the middle position with all
/// elements before it not greater and all elements after it not smaller.
///
/// * `array` - The data.
/// * `order` - Ordering function.
pub fn elements_quickmedian<T: Clone, F>(array: &mut [T], order: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    quickmedian_slots(array, &order);
}

/// Sorts the elements of a slice in place with heapsort.
///
/// * `array` - The data.
/// * `order` - Ordering function.
pub fn elements_heapsort<T: Clone, F>(array: &mut [T], order: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    heapsort_slots(array, &order);
}

/// Returns true if the elements of a slice are ordered.
///
/// * `array` - The data.
/// * `order` - Ordering function.
pub fn elements_is_correct<T, F>(array: &[T], order: F) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    array
        .windows(2)
        .all(|w| order(&w[0], &w[1]) != Ordering::Greater)
}

/// Sorts the array, or only the permutation if one is given.
///
/// * `array`       - The data.
/// * `order`       - Ordering function.
/// * `permutation` - Optional permutation of indices into `array`.
pub fn quicksort<T: Clone, F>(array: &mut [T], order: F, permutation: Option<&mut [usize]>)
where
    F: Fn(&T, &T) -> Ordering,
{
    match permutation {
        Some(perm) => permutation_quicksort(array, order, perm),
        None => elements_quicksort(array, order),
    }
}

/// Median partition of the array, or only of the permutation if one is
/// given.
///
/// * `array`       - The data.
/// * `order`       - Ordering function.
/// * `permutation` - Optional permutation of indices into `array`.
pub fn quickmedian<T: Clone, F>(array: &mut [T], order: F, permutation: Option<&mut [usize]>)
where
    F: Fn(&T, &T) -> Ordering,
{
    match permutation {
        Some(perm) => permutation_quickmedian(array, order, perm),
        None => elements_quickmedian(array, order),
    }
}

/// Checks the order of the array, or of the permutation if one is given.
///
/// * `array`       - The data.
/// * `order`       - Ordering function.
/// * `permutation` - Optional permutation of indices into `array`.
pub fn is_correct<T, F>(array: &[T], order: F, permutation: Option<&[usize]>) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    match permutation {
        Some(perm) => permutation_is_correct(array, order, perm),
        None => elements_is_correct(array, order),
    }
}

/// Scrambles the order of a slice with one pass of random exchanges.
///
/// * `array` - The data.
/// * `rng`   - The random number generator.
pub fn scramble<T>(array: &mut [T], rng: &mut Pcg32) {
    let number = array.len();
    for i in 0..number {
        let mut new_index = (rng.uniform_float() * number as Float) as usize;
        if new_index + 1 > number {
            new_index = 0;
        }
        if new_index != i {
            array.swap(i, new_index);
        }
    }
}

fn check_permutation<T>(array: &[T], perm: &[usize]) {
    foundation_assert!(
        perm.iter().all(|i| *i < array.len()),
        "permutation refers past the {} array elements",
        array.len()
    );
}

/// Picks the median of the slots at `l`, `m` and `r` as pivot. The slot the
/// pivot was taken from receives the value at `l`, leaving a hole at `l`.
fn median_of_three_pivot<S: Clone, F>(s: &mut [S], l: usize, m: usize, r: usize, cmp: &F) -> S
where
    F: Fn(&S, &S) -> Ordering,
{
    let less = |a: usize, b: usize, s: &[S]| cmp(&s[a], &s[b]) == Ordering::Less;

    let from = if less(l, m, s) {
        if less(m, r, s) {
            m
        } else if less(l, r, s) {
            r
        } else {
            l
        }
    } else if less(r, m, s) {
        m
    } else if less(r, l, s) {
        r
    } else {
        l
    };

    let pivot = s[from].clone();
    if from != l {
        s[from] = s[l].clone();
    }
    pivot
}

/// Partitions `s[left..=right]` around the pivot, filling the hole at
/// `left`. Returns the final pivot position; slots before it are not
/// greater and slots after it are not smaller than the pivot.
fn partition_slots<S: Clone, F>(
    s: &mut [S],
    pivot: S,
    mut left: usize,
    mut right: usize,
    cmp: &F,
) -> usize
where
    F: Fn(&S, &S) -> Ordering,
{
    let le = |a: &S, b: &S| cmp(a, b) != Ordering::Greater;
    loop {
        while left < right && le(&pivot, &s[right]) {
            right -= 1;
        }
        if left == right {
            s[left] = pivot;
            return left;
        }
        s[left] = s[right].clone();
        left += 1;

        while left < right && le(&s[left], &pivot) {
            left += 1;
        }
        if left == right {
            s[right] = pivot;
            return right;
        }
        s[right] = s[left].clone();
        right -= 1;
    }
}

fn sort_2<S: Clone, F>(s: &mut [S], l: usize, r: usize, cmp: &F)
where
    F: Fn(&S, &S) -> Ordering,
{
    if cmp(&s[r], &s[l]) == Ordering::Less {
        s.swap(l, r);
    }
}

fn sort_3<S: Clone, F>(s: &mut [S], i0: usize, i1: usize, i2: usize, cmp: &F)
where
    F: Fn(&S, &S) -> Ordering,
{
    let gt = |a: &S, b: &S| cmp(a, b) == Ordering::Greater;

    if gt(&s[i0], &s[i1]) {
        if gt(&s[i0], &s[i2]) {
            // s[i0] is the largest.
            let store = s[i2].clone();
            s[i2] = s[i0].clone();
            if gt(&s[i1], &store) {
                s[i0] = store;
            } else {
                s[i0] = s[i1].clone();
                s[i1] = store;
            }
        } else {
            s.swap(i0, i1);
        }
    } else if gt(&s[i1], &s[i2]) {
        // s[i1] is the largest.
        let store = s[i2].clone();
        s[i2] = s[i1].clone();
        if gt(&s[i0], &store) {
            s[i1] = s[i0].clone();
            s[i0] = store;
        } else {
            s[i1] = store;
        }
    }
}

/// Quicksort that recurses on the upper part and loops on the lower part.
/// Past `max_depth` the upper part is finished without further recursion.
fn quicksort_slots<S: Clone, F>(s: &mut [S], cmp: &F, depth: usize, max_depth: usize)
where
    F: Fn(&S, &S) -> Ordering,
{
    let mut number = s.len();
    while number > 3 {
        let mid = number / 2;
        let pivot = median_of_three_pivot(s, 0, mid, number - 1, cmp);
        let left = partition_slots(s, pivot, 0, number - 1, cmp);
        let right = left + 1;

        if depth > max_depth {
            bounded_sort_slots(&mut s[right..number], cmp);
        } else {
            quicksort_slots(&mut s[right..number], cmp, depth + 1, max_depth);
        }
        number = left;
    }

    match number {
        3 => sort_3(s, 0, 1, 2, cmp),
        2 => sort_2(s, 0, 1, cmp),
        _ => {}
    }
}

/// Sorts without recursion: median partition followed by heapsort of both
/// halves.
fn bounded_sort_slots<S: Clone, F>(s: &mut [S], cmp: &F)
where
    F: Fn(&S, &S) -> Ordering,
{
    let median = s.len() / 2;
    quickmedian_slots(s, cmp);
    if median < s.len() {
        let (lower, upper) = s.split_at_mut(median);
        heapsort_slots(lower, cmp);
        heapsort_slots(&mut upper[1..], cmp);
    }
}

fn quickmedian_slots<S: Clone, F>(s: &mut [S], cmp: &F)
where
    F: Fn(&S, &S) -> Ordering,
{
    let mut head = 0;
    let mut tail = s.len();
    let median = s.len() / 2;

    while tail - head > 3 {
        let mid = (head + tail) / 2;
        let pivot = median_of_three_pivot(s, head, mid, tail - 1, cmp);
        let left = partition_slots(s, pivot, head, tail - 1, cmp);

        match median.cmp(&left) {
            Ordering::Less => tail = left,
            Ordering::Greater => head = left + 1,
            Ordering::Equal => return,
        }
    }

    match tail - head {
        3 => sort_3(s, head, head + 1, head + 2, cmp),
        2 => sort_2(s, head, head + 1, cmp),
        _ => {}
    }
}

fn heapsort_slots<S: Clone, F>(s: &mut [S], cmp: &F)
where
    F: Fn(&S, &S) -> Ordering,
{
    let number = s.len();
    let less = |a: &S, b: &S| cmp(a, b) == Ordering::Less;

    // Build a max-heap by sifting each slot up.
    for h in 1..number {
        let store = s[h].clone();
        let mut j = h;
        while j > 0 {
            let i = (j - 1) / 2;
            if !less(&s[i], &store) {
                break;
            }
            s[j] = s[i].clone();
            j = i;
        }
        s[j] = store;
    }

    // Move the maximum to the end and sift the displaced slot down.
    for h in (1..number).rev() {
        let store = s[h].clone();
        s[h] = s[0].clone();
        let mut i = 0;
        let mut j = 1;
        while j < h {
            let k = j + 1;
            if k < h && less(&s[j], &s[k]) {
                j = k;
            }
            if !less(&store, &s[j]) {
                break;
            }
            s[i] = s[j].clone();
            i = j;
            j = 2 * i + 1;
        }
        s[i] = store;
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
