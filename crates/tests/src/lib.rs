pub mod fixtures;

#[cfg(test)]
mod invitation_tests;
#[cfg(test)]
mod shop_tests;
#[cfg(test)]
mod team_tests;
#[cfg(test)]
mod waitlist_tests;
#[cfg(test)]
mod webhook_tests;
