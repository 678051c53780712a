//! NXDN (ICOM/Kenwood, NXDN Technical Committee) link-layer codecs: SACCH/FACCH1
//! channel words built from Hamming(16,11,4) halves, and the link control record they
//! carry on the control and traffic channels.

pub mod consts;
pub mod channel;
pub mod lc;
pub mod rcch;
