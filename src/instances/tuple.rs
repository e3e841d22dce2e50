//! Tuple instances, generated by this crate's own derivation macro
//!
//! Tuples are primitive and every component is written with its own version.

use vercodec_derive::derive_safecopy;

derive_safecopy! {
    #[safecopy(version = 0, kind = primitive, strategy = simple)]
    impl<A, B> SafeCopy for (A, B);

    #[safecopy(version = 0, kind = primitive, strategy = simple)]
    impl<A, B, C> SafeCopy for (A, B, C);

    #[safecopy(version = 0, kind = primitive, strategy = simple)]
    impl<A, B, C, D> SafeCopy for (A, B, C, D);

    #[safecopy(version = 0, kind = primitive, strategy = simple)]
    impl<A, B, C, D, E> SafeCopy for (A, B, C, D, E);

    #[safecopy(version = 0, kind = primitive, strategy = simple)]
    impl<A, B, C, D, E, F> SafeCopy for (A, B, C, D, E, F);
}
