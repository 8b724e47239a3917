use core::fmt;

/// Protocol revision tag. One-to-one corresponding to an `u8` value, ordered
/// from oldest to newest so that revisions can be compared directly.
///
/// Values beyond [`Revision::OSAKA`] are representable so that an engine can
/// reject parameters carrying a revision it does not implement yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Revision(pub u8);

impl Revision {
	/// Istanbul
	pub const ISTANBUL: Revision = Revision(0);
	/// Berlin
	pub const BERLIN: Revision = Revision(1);
	/// London
	pub const LONDON: Revision = Revision(2);
	/// Paris
	pub const PARIS: Revision = Revision(3);
	/// Shanghai
	pub const SHANGHAI: Revision = Revision(4);
	/// Cancun
	pub const CANCUN: Revision = Revision(5);
	/// Prague
	pub const PRAGUE: Revision = Revision(6);
	/// Osaka
	pub const OSAKA: Revision = Revision(7);

	/// The newest revision this interpreter implements.
	pub const NEWEST_SUPPORTED: Revision = Revision::OSAKA;

	/// Number of supported revisions.
	pub(crate) const COUNT: usize = Revision::NEWEST_SUPPORTED.0 as usize + 1;
}

impl fmt::Display for Revision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match *self {
			Revision::ISTANBUL => "Istanbul",
			Revision::BERLIN => "Berlin",
			Revision::LONDON => "London",
			Revision::PARIS => "Paris",
			Revision::SHANGHAI => "Shanghai",
			Revision::CANCUN => "Cancun",
			Revision::PRAGUE => "Prague",
			Revision::OSAKA => "Osaka",
			Revision(other) => return write!(f, "revision {other}"),
		};
		f.write_str(name)
	}
}
