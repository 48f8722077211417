// tests/digits.rs
use lsys_tree::{DigitCursor, DigitStream};

#[test]
fn test_pi_leading_digits() {
    let stream = DigitStream::pi(40);
    let digits: String = (0..40)
        .map(|i| char::from(b'0' + stream.digit(i)))
        .collect();
    assert_eq!(digits, "1415926535897932384626433832795028841971");
    assert_eq!(stream.precision(), 40);
}

#[test]
fn test_pi_feynman_point() {
    // Six nines start at the 762nd decimal place.
    let stream = DigitStream::pi(1000);
    let run: Vec<u8> = (761..767).map(|i| stream.digit(i)).collect();
    assert_eq!(run, vec![9; 6]);
    assert_eq!(stream.digit(760), 4);
}

#[test]
fn test_digit_is_periodic_over_precision() {
    let stream = DigitStream::pi(97);
    for i in 0..300 {
        assert_eq!(stream.digit(i), stream.digit(i + 97), "index {i}");
    }
}

#[test]
fn test_digit_is_pure() {
    let a = DigitStream::pi(500);
    let b = DigitStream::pi(500);
    assert_eq!(a, b);
    for i in [0, 17, 499, 12_345] {
        assert_eq!(a.digit(i), a.digit(i));
    }
}

#[test]
fn test_zero_precision_yields_one_digit() {
    let stream = DigitStream::pi(0);
    assert_eq!(stream.precision(), 1);
    assert_eq!(stream.digit(5), 1);
}

#[test]
fn test_from_digits_rejects_bad_input() {
    assert!(DigitStream::from_digits(vec![]).is_none());
    assert!(DigitStream::from_digits(vec![1, 2, 10]).is_none());
    let stream = DigitStream::from_digits(vec![7, 3]).unwrap();
    assert_eq!(stream.digit(0), 7);
    assert_eq!(stream.digit(3), 3);
}

#[test]
fn test_cursor_next_peek_and_seek() {
    let stream = DigitStream::from_digits(vec![0, 1, 2, 3, 4]).unwrap();
    let mut cursor = DigitCursor::new(3);

    assert_eq!(cursor.peek(&stream, 0), 3);
    assert_eq!(cursor.peek(&stream, 1), 4);
    assert_eq!(cursor.position(), 3, "peek must not move");

    assert_eq!(cursor.next(&stream), 3);
    assert_eq!(cursor.next(&stream), 4);
    assert_eq!(cursor.next(&stream), 0, "wraps at the period");
    assert_eq!(cursor.position(), 6);

    cursor.seek(1);
    assert_eq!(cursor.next(&stream), 1);
}

#[test]
fn test_cursor_reserve_is_disjoint() {
    let stream = DigitStream::pi(100);
    let mut parent = DigitCursor::new(10);
    let mut slice = parent.reserve(20);

    assert_eq!(slice.position(), 10);
    assert_eq!(parent.position(), 30);

    // Reading from the slice leaves the parent untouched.
    for _ in 0..50 {
        slice.next(&stream);
    }
    assert_eq!(parent.position(), 30);
    assert_eq!(parent.next(&stream), stream.digit(30));
}
