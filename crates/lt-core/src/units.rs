// lt-core/src/units.rs

use uom::si::f64::{
    Information as UomInformation, InformationRate as UomInformationRate, Length as UomLength,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Information = UomInformation;
pub type InformationRate = UomInformationRate;
pub type Length = UomLength;
pub type Time = UomTime;

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn bits(v: f64) -> Information {
    use uom::si::information::bit;
    Information::new::<bit>(v)
}

#[inline]
pub fn bps(v: f64) -> InformationRate {
    use uom::si::information_rate::bit_per_second;
    InformationRate::new::<bit_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

/// Average rate of `amount` transferred over `window`.
pub fn rate_over(amount: Information, window: Time) -> InformationRate {
    use uom::si::information::bit;
    use uom::si::time::second;
    bps(amount.get::<bit>() / window.get::<second>())
}
